//! Configuration types for vacancy-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Remote endpoint settings
///
/// Groups everything needed to build the shared HTTP client and the page URLs.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root (default: "https://api.hh.ru/")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Resource path joined onto `base_url` (default: "vacancies")
    #[serde(default = "default_path")]
    pub path: String,

    /// User-Agent header sent with every request
    ///
    /// hh.ru answers 400 to requests that carry no User-Agent, so this is
    /// always set. Defaults to `vacancy-fetch/<crate version>`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds (None = transport default, i.e. no timeout)
    ///
    /// Without a timeout a stalled server holds its page task, and therefore
    /// the whole run, open indefinitely.
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            user_agent: default_user_agent(),
            request_timeout: None,
        }
    }
}

/// Order in which successful pages contribute their records
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOrder {
    /// Records appear in the order their pages finished (default)
    #[default]
    Arrival,
    /// Records are grouped by ascending page index
    PageIndex,
}

/// Fan-out settings: what to ask for and how hard to hit the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Search text sent as the `text` query parameter (default: "Java junior")
    #[serde(default = "default_query")]
    pub query: String,

    /// Number of pages to request, indices 0..page_count (default: 39)
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    /// Records per page, sent as `per_page` (default: 49)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum pages in flight at once (None = unbounded, every page at once)
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// Merge order for the aggregated records
    #[serde(default)]
    pub merge_order: MergeOrder,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            page_count: default_page_count(),
            page_size: default_page_size(),
            max_concurrent: None,
            merge_order: MergeOrder::default(),
        }
    }
}

/// Main configuration for a fetch run
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Fan-out settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.page_size == 0 {
            return Err(Error::config("page_size", "must be greater than 0"));
        }
        if self.fetch.max_concurrent == Some(0) {
            return Err(Error::config(
                "max_concurrent",
                "must be at least 1 (omit it for unbounded)",
            ));
        }
        if self.api.path.trim_matches('/').is_empty() {
            return Err(Error::config("path", "must not be empty"));
        }
        url::Url::parse(&self.api.base_url)?;
        Ok(())
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://api.hh.ru/".to_string()
}

fn default_path() -> String {
    "vacancies".to_string()
}

fn default_user_agent() -> String {
    concat!("vacancy-fetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_query() -> String {
    "Java junior".to_string()
}

fn default_page_count() -> u32 {
    39
}

fn default_page_size() -> u32 {
    49
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, "https://api.hh.ru/");
        assert_eq!(config.api.path, "vacancies");
        assert_eq!(config.fetch.page_count, 39);
        assert_eq!(config.fetch.page_size, 49);
        assert_eq!(config.fetch.max_concurrent, None);
        assert_eq!(config.fetch.merge_order, MergeOrder::Arrival);
        assert!(config.api.user_agent.starts_with("vacancy-fetch/"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let json = r#"{
            "fetch": { "query": "Rust", "max_concurrent": 8, "merge_order": "page_index" },
            "api": { "request_timeout": 15 }
        }"#;

        let config: Config = serde_json::from_str(json).expect("deserialize failed");

        assert_eq!(config.fetch.query, "Rust");
        assert_eq!(config.fetch.max_concurrent, Some(8));
        assert_eq!(config.fetch.merge_order, MergeOrder::PageIndex);
        assert_eq!(config.fetch.page_size, 49, "unspecified field keeps default");
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.api.base_url, "https://api.hh.ru/");
    }

    #[test]
    fn request_timeout_serializes_as_seconds() {
        let api = ApiConfig {
            request_timeout: Some(Duration::from_secs(30)),
            ..ApiConfig::default()
        };

        let json = serde_json::to_value(&api).expect("serialize failed");

        assert_eq!(json["request_timeout"], 30);
    }

    #[test]
    fn default_config_validates() {
        Config::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = Config::default();
        config.fetch.page_size = 0;

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("page_size")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn zero_concurrency_cap_is_rejected() {
        let mut config = Config::default();
        config.fetch.max_concurrent = Some(0);

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("max_concurrent")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();

        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut config = Config::default();
        config.api.path = "/".to_string();

        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fetch": {{ "page_count": 3, "query": "Go junior" }} }}"#).unwrap();

        let config = Config::from_json_file(file.path()).expect("load failed");

        assert_eq!(config.fetch.page_count, 3);
        assert_eq!(config.fetch.query, "Go junior");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = Config::from_json_file(dir.path().join("absent.json"));

        assert!(matches!(result, Err(Error::Io(_))));
    }
}
