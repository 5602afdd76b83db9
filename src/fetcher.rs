//! Single-page fetching over HTTP
//!
//! [`PageFetcher`] is the seam between the coordinator and the network:
//! the coordinator only ever sees a [`FetchOutcome`] per page, so tests can
//! substitute a scripted fetcher. [`HttpPageFetcher`] is the production
//! implementation on top of one shared `reqwest::Client`.

use reqwest::StatusCode;
use url::Url;

use crate::config::ApiConfig;
use crate::decoder::{VacancyPage, decode_page};
use crate::error::{FetchError, Result};
use crate::types::{FetchOutcome, PageRequest, PageResponse};

/// Decoded page or the reason it failed
pub type FetchResult = std::result::Result<VacancyPage, FetchError>;

/// Abstraction over page fetching, enabling testability.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and decode one page.
    async fn fetch_page(&self, request: &PageRequest) -> FetchResult;

    /// Fetch one page and tag the result with its index.
    async fn fetch(&self, request: &PageRequest) -> FetchOutcome {
        FetchOutcome::from_result(request.page(), self.fetch_page(request).await)
    }
}

/// Production [`PageFetcher`] backed by reqwest.
///
/// Cloning is cheap: `reqwest::Client` is reference-counted and safe to use
/// from many tasks at once, so every page task shares one connection pool.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpPageFetcher {
    /// Build a fetcher with a client configured from `config`.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder.build()?, config)
    }

    /// Build a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: endpoint_url(&config.base_url, &config.path)?,
        })
    }

    /// Resource URL without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL for one page: `<endpoint>?text=<query>&per_page=<n>&page=<i>`
    pub fn page_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(Some(&format!(
            "text={}&per_page={}&page={}",
            urlencoding::encode(request.query()),
            request.per_page(),
            request.page()
        )));
        url
    }

    /// Issue the GET and read as much of the body as the status calls for.
    async fn send(&self, request: &PageRequest) -> std::result::Result<PageResponse, FetchError> {
        let url = self.page_url(request);
        tracing::debug!(page = request.page(), url = %url, "Requesting page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&e))?;

        let status = response.status();
        let body = if status.is_success() || status == StatusCode::BAD_REQUEST {
            response
                .bytes()
                .await
                .map_err(|e| FetchError::transport(&e))?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(PageResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> FetchResult {
        let response = self.send(request).await?;
        interpret_response(request.page(), response)
    }
}

/// Join `path` onto `base`, tolerating a missing trailing slash on the base
/// and leading slashes on the path.
fn endpoint_url(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Classify a raw response into decoded records or a page-local failure.
///
/// Only 400 bodies are inspected for diagnostics; other error statuses are
/// reported by code alone.
pub(crate) fn interpret_response(page: u32, response: PageResponse) -> FetchResult {
    let status = StatusCode::from_u16(response.status).ok();
    match status {
        Some(s) if s.is_success() => decode_page(&response.body).map_err(FetchError::from),
        Some(StatusCode::BAD_REQUEST) => {
            let detail = serde_json::from_slice::<serde_json::Value>(&response.body)
                .ok()
                .map(|json| json.to_string());
            tracing::warn!(
                page,
                detail = detail.as_deref().unwrap_or("<non-JSON body>"),
                "Server rejected page request"
            );
            Err(FetchError::BadRequest { detail })
        }
        _ => Err(FetchError::UnexpectedStatus {
            status: response.status,
        }),
    }
}
