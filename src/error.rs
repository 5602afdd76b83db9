//! Error types for vacancy-fetch
//!
//! Two layers of errors live here:
//! - [`Error`] covers setup failures (bad configuration, client construction,
//!   reading a config file). These are returned to the caller as `Err`.
//! - [`FetchError`] and [`DecodeError`] classify why a single page failed.
//!   They never escape a page task; they are carried inside
//!   [`FetchOutcome::Failure`](crate::types::FetchOutcome::Failure) and end up
//!   in [`AggregateResult::failed_pages`](crate::types::AggregateResult).

use thiserror::Error;

/// Result type alias for vacancy-fetch setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vacancy-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_size")
        key: Option<String>,
    },

    /// HTTP client could not be constructed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Base URL or path could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error (config files)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Why a page payload could not be turned into vacancies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Body is not well-formed JSON
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// JSON is well-formed but lacks the expected top-level shape
    #[error("unexpected page shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => DecodeError::Shape(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                DecodeError::Malformed(err.to_string())
            }
        }
    }
}

/// Page-local failure classification
///
/// Every variant is contained at the page-task boundary: it becomes a
/// failure outcome for one page index and never aborts sibling pages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or body-read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered HTTP 400 for this page
    #[error("bad request")]
    BadRequest {
        /// Compact rendering of the error body, when it was valid JSON
        detail: Option<String>,
    },

    /// Any other non-2xx status; the body is not decoded
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code returned by the server
        status: u16,
    },

    /// 2xx response whose body could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The run was cancelled before this page completed
    #[error("cancelled")]
    Cancelled,

    /// The page task panicked or vanished without reporting
    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl FetchError {
    /// Build a transport error from a reqwest failure, keeping the useful bits.
    pub fn transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_body() || err.is_decode() {
            "body"
        } else {
            "request"
        };
        FetchError::Transport(format!("{kind}: {err}"))
    }

    /// Machine-readable failure code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport_error",
            FetchError::BadRequest { .. } => "bad_request",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::Decode(_) => "decode_error",
            FetchError::Cancelled => "cancelled",
            FetchError::TaskFailed(_) => "task_failed",
        }
    }
}
