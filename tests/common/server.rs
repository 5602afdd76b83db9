//! Mock vacancies API on top of wiremock

use std::sync::Arc;
use std::time::Duration;

use vacancy_fetch::{ApiConfig, FanOutCoordinator, HttpPageFetcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::page_body;

/// Records served on each successful page
pub const ITEMS_PER_PAGE: u32 = 3;

/// Server-reported match count used by [`mount_page`]
pub const FOUND: u64 = 1910;

/// Mount a response for exactly one page index.
pub async fn mount_page_response(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/vacancies"))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mount a successful page, optionally delayed.
pub async fn mount_page(server: &MockServer, page: u32, per_page: u32, delay: Duration) {
    let body = page_body(page, per_page, ITEMS_PER_PAGE, FOUND);
    mount_page_response(
        server,
        page,
        ResponseTemplate::new(200)
            .set_body_string(body)
            .set_delay(delay),
    )
    .await;
}

/// Mount successful pages `0..page_count` without delay.
pub async fn mount_pages(server: &MockServer, page_count: u32, per_page: u32) {
    for page in 0..page_count {
        mount_page(server, page, per_page, Duration::ZERO).await;
    }
}

/// API settings pointing at the mock server.
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_secs(10)),
        ..ApiConfig::default()
    }
}

/// Unbounded coordinator talking HTTP to the mock server.
pub fn http_coordinator(server: &MockServer) -> FanOutCoordinator {
    let fetcher = HttpPageFetcher::new(&api_config(server)).expect("mock server URL is valid");
    FanOutCoordinator::new(Arc::new(fetcher))
}

/// Number of requests the server saw for `page`.
pub async fn requests_for_page(server: &MockServer, page: u32) -> usize {
    let wanted = page.to_string();
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            request
                .url
                .query_pairs()
                .any(|(key, value)| key == "page" && value == wanted.as_str())
        })
        .count()
}
