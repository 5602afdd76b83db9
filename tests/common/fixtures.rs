//! Vacancy page payloads

use serde_json::{Value, json};

/// Default query used by the integration tests
pub const QUERY: &str = "Java junior";

/// Record id for item `item` on page `page`, unique across a run.
pub fn record_id(page: u32, item: u32) -> String {
    format!("{page}-{item}")
}

/// One vacancy item shaped like the hh.ru search payload.
pub fn vacancy_json(page: u32, item: u32) -> Value {
    let id = record_id(page, item);
    json!({
        "id": id,
        "name": format!("Junior Java Developer #{id}"),
        "url": format!("https://api.hh.ru/vacancies/{id}"),
        "alternate_url": format!("https://hh.ru/vacancy/{id}"),
        "area": {"id": "1", "name": "Moscow"},
        "employer": {"id": 1455, "name": "Example LLC", "trusted": true},
        "salary": {"from": 80000, "to": null, "currency": "RUR", "gross": false},
        "published_at": "2024-03-01T10:15:00+0300",
        "archived": false,
        "has_test": false
    })
}

/// A full page body with `items` vacancies.
pub fn page_body(page: u32, per_page: u32, items: u32, found: u64) -> String {
    let items: Vec<Value> = (0..items).map(|item| vacancy_json(page, item)).collect();
    let pages = found.div_ceil(u64::from(per_page.max(1)));
    json!({
        "found": found,
        "page": page,
        "pages": pages,
        "per_page": per_page,
        "items": items
    })
    .to_string()
}

/// Page index encoded in a record id built by [`record_id`].
pub fn page_of(record_id: &str) -> u32 {
    record_id
        .split_once('-')
        .and_then(|(page, _)| page.parse().ok())
        .unwrap_or_else(|| panic!("record id {record_id} was not built by record_id()"))
}
