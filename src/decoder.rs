//! Page payload decoding
//!
//! All knowledge of the vacancies schema lives here. A page fails to decode
//! only when the body is not JSON or lacks the top-level `found` / `items`
//! shape; individual vacancy fields are mapped permissively and fall back to
//! their defaults when absent or mistyped.

use chrono::{DateTime, FixedOffset};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// hh.ru timestamps use a colon-less offset (`2024-03-01T10:15:00+0300`)
const HH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One job posting
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    /// Vacancy identifier (string in the API, numbers are accepted too)
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    /// Vacancy title
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    /// API URL of the full vacancy
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,

    /// Public web page of the vacancy
    #[serde(default, deserialize_with = "lenient")]
    pub alternate_url: String,

    /// Region the vacancy is posted in
    #[serde(default, deserialize_with = "lenient")]
    pub area: Option<NamedRef>,

    /// Hiring company
    #[serde(default, deserialize_with = "lenient")]
    pub employer: Option<Employer>,

    /// Salary range, when disclosed
    #[serde(default, deserialize_with = "lenient")]
    pub salary: Option<Salary>,

    /// Work schedule (full day, remote, ...)
    #[serde(default, deserialize_with = "lenient")]
    pub schedule: Option<NamedRef>,

    /// Short requirement/responsibility excerpts
    #[serde(default, deserialize_with = "lenient")]
    pub snippet: Option<Snippet>,

    /// Publication time
    #[serde(default, deserialize_with = "timestamp")]
    pub published_at: Option<DateTime<FixedOffset>>,

    /// Whether the vacancy is archived
    #[serde(default, deserialize_with = "lenient")]
    pub archived: bool,
}

/// `{id, name}` dictionary reference used for areas, schedules and types
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub alternate_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub trusted: bool,
}

/// Salary bounds; either side may be open
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: String,
    /// True when the amounts are before tax
    #[serde(default, deserialize_with = "lenient")]
    pub gross: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(default, deserialize_with = "lenient")]
    pub requirement: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub responsibility: Option<String>,
}

/// A decoded page of search results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VacancyPage {
    /// Total matches reported by the server for the whole search
    pub found: u64,
    /// Page index echoed by the server
    pub page: u32,
    /// Total page count reported by the server
    pub pages: u32,
    /// Page size echoed by the server
    pub per_page: u32,
    /// Vacancies on this page
    pub items: Vec<Vacancy>,
}

/// Top-level envelope. `found` and `items` are the required shape; the
/// paging counters are informational.
#[derive(Deserialize)]
struct RawPage {
    found: u64,
    items: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    page: u32,
    #[serde(default, deserialize_with = "lenient")]
    pages: u32,
    #[serde(default, deserialize_with = "lenient")]
    per_page: u32,
}

/// Decode a raw page body into vacancies.
///
/// Elements of `items` that are not objects are skipped.
pub fn decode_page(body: &[u8]) -> Result<VacancyPage, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(DecodeError::Shape(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }

    let raw: RawPage = serde_json::from_value(value)?;
    let total_items = raw.items.len();
    let items: Vec<Vacancy> = raw
        .items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| Vacancy::deserialize(item).ok())
        .collect();

    if items.len() < total_items {
        tracing::debug!(
            skipped = total_items - items.len(),
            total = total_items,
            "Skipped non-object entries in items"
        );
    }

    Ok(VacancyPage {
        found: raw.found,
        page: raw.page,
        pages: raw.pages,
        per_page: raw.per_page,
        items,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deserialize `T`, falling back to `T::default()` on a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::String(raw) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(DateTime::parse_from_rfc3339(&raw)
        .or_else(|_| DateTime::parse_from_str(&raw, HH_TIMESTAMP_FORMAT))
        .ok())
}
