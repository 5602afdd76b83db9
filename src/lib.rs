//! # vacancy-fetch
//!
//! Bounded-concurrency paginated fetcher for the hh.ru vacancies search API.
//!
//! ## Design Philosophy
//!
//! vacancy-fetch is designed to be:
//! - **Partial-failure tolerant** - A failing page is reported, never fatal to the run
//! - **Barrier-synchronized** - A run returns only once every requested page has reported
//! - **Configurable** - Concurrency cap, merge order and timeouts are all settings
//! - **Library-first** - The binary is a thin wrapper around [`FanOutCoordinator`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vacancy_fetch::{Config, FanOutCoordinator, HttpPageFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = Arc::new(HttpPageFetcher::new(&config.api)?);
//!
//!     let coordinator = FanOutCoordinator::from_config(fetcher, &config.fetch);
//!     let result = coordinator.run(5, "Rust junior", 20).await?;
//!
//!     println!("{result}");
//!     for (page, reason) in &result.failed_pages {
//!         eprintln!("page {page} failed: {reason}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Merging page outcomes
pub mod aggregator;
/// Configuration types
pub mod config;
/// Fan-out over page indices
pub mod coordinator;
/// Page payload decoding and the vacancy schema
pub mod decoder;
/// Error types
pub mod error;
/// Single-page HTTP fetching
pub mod fetcher;
/// Core types
pub mod types;

// Re-export commonly used types
pub use aggregator::aggregate;
pub use config::{ApiConfig, Config, FetchConfig, MergeOrder};
pub use coordinator::FanOutCoordinator;
pub use decoder::{Vacancy, VacancyPage, decode_page};
pub use error::{DecodeError, Error, FetchError, Result};
pub use fetcher::{FetchResult, HttpPageFetcher, PageFetcher};
pub use types::{AggregateResult, FetchOutcome, PageRequest, PageResponse};

use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Returns early, without cancelling, if the token is cancelled elsewhere first.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vacancy_fetch::{ApiConfig, FanOutCoordinator, HttpPageFetcher, cancel_on_signal};
///
/// # async fn example() -> vacancy_fetch::Result<()> {
/// let fetcher = Arc::new(HttpPageFetcher::new(&ApiConfig::default())?);
/// let coordinator = FanOutCoordinator::new(fetcher);
/// tokio::spawn(cancel_on_signal(coordinator.cancel_token()));
///
/// let _result = coordinator.run(39, "Java junior", 49).await?;
/// # Ok(())
/// # }
/// ```
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        _ = wait_for_signal() => {
            tracing::info!("Cancelling run: pending pages will be reported as cancelled");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
