//! Fan-out/fan-in over page indices
//!
//! Split into focused submodules:
//! - [`task`] - One page task: concurrency permit, cancellation, panic containment

mod task;


use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::aggregator::aggregate;
use crate::config::{FetchConfig, MergeOrder};
use crate::error::{Error, FetchError, Result};
use crate::fetcher::PageFetcher;
use crate::types::{AggregateResult, FetchOutcome, PageRequest};

use task::{PageTaskContext, run_page_task};

/// Runs one fetch task per page and merges what comes back.
///
/// Page failures never surface as `Err`: every requested index ends up in
/// either [`AggregateResult::succeeded_pages`] or
/// [`AggregateResult::failed_pages`].
pub struct FanOutCoordinator {
    fetcher: Arc<dyn PageFetcher>,
    max_concurrent: Option<usize>,
    merge_order: MergeOrder,
    cancel_token: CancellationToken,
}

impl FanOutCoordinator {
    /// Unbounded fan-out, arrival-order merge, never cancelled.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_concurrent: None,
            merge_order: MergeOrder::default(),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Coordinator with the concurrency cap and merge order from `config`.
    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &FetchConfig) -> Self {
        Self::new(fetcher)
            .with_max_concurrent(config.max_concurrent)
            .with_merge_order(config.merge_order)
    }

    /// Cap the number of pages in flight (`None` = unbounded).
    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    /// Token that cancels runs of this coordinator.
    ///
    /// After cancellation, pages not yet started report
    /// [`FetchError::Cancelled`] without issuing a request, and in-flight
    /// fetches are aborted with the same reason.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Fetch pages `0..page_count` concurrently and merge the results.
    ///
    /// Returns only after exactly `page_count` outcomes have been collected.
    /// `Err` is reserved for invalid arguments (`page_size == 0` or a zero
    /// concurrency cap).
    pub async fn run(
        &self,
        page_count: u32,
        query: &str,
        page_size: u32,
    ) -> Result<AggregateResult> {
        if page_size == 0 {
            return Err(Error::config("page_size", "must be greater than 0"));
        }
        if self.max_concurrent == Some(0) {
            return Err(Error::config("max_concurrent", "must be at least 1"));
        }

        tracing::info!(
            page_count,
            page_size,
            query,
            max_concurrent = ?self.max_concurrent,
            "Starting page fan-out"
        );

        let outcomes = self
            .collect_outcomes(page_count, Arc::from(query), page_size)
            .await;
        let result = aggregate(outcomes, self.merge_order);

        tracing::info!(
            records = result.records.len(),
            succeeded = result.succeeded_pages.len(),
            failed = result.failed_pages.len(),
            "Page fan-out finished"
        );

        Ok(result)
    }

    /// [`run`](Self::run) with the query and paging taken from `config`.
    pub async fn run_config(&self, config: &FetchConfig) -> Result<AggregateResult> {
        self.run(config.page_count, &config.query, config.page_size)
            .await
    }

    /// Spawn one task per page and wait until every page has reported.
    async fn collect_outcomes(
        &self,
        page_count: u32,
        query: Arc<str>,
        page_size: u32,
    ) -> Vec<FetchOutcome> {
        let expected = page_count as usize;
        if expected == 0 {
            return Vec::new();
        }

        let limiter = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));
        let (outcome_tx, mut outcome_rx) = mpsc::channel(expected);

        // Dropping the set aborts any task still running if this future is
        // dropped mid-run.
        let mut tasks = JoinSet::new();
        for page in 0..page_count {
            tasks.spawn(run_page_task(PageTaskContext {
                request: PageRequest::new(page, page_size, Arc::clone(&query)),
                fetcher: Arc::clone(&self.fetcher),
                limiter: limiter.clone(),
                cancel_token: self.cancel_token.clone(),
                outcome_tx: outcome_tx.clone(),
            }));
        }
        drop(outcome_tx);

        let mut seen = HashSet::with_capacity(expected);
        let mut outcomes = Vec::with_capacity(expected);
        while outcomes.len() < expected {
            let Some(outcome) = outcome_rx.recv().await else {
                break;
            };
            let page = outcome.page();
            if page >= page_count || !seen.insert(page) {
                tracing::warn!(page, "Ignoring duplicate or out-of-range page outcome");
                continue;
            }
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        // Channel closed early: some task ended without reporting
        if outcomes.len() < expected {
            for page in (0..page_count).filter(|p| !seen.contains(p)) {
                tracing::error!(page, "Page task exited without reporting an outcome");
                outcomes.push(FetchOutcome::Failure {
                    page,
                    reason: FetchError::TaskFailed(
                        "task exited without reporting an outcome".to_string(),
                    ),
                });
            }
        }

        outcomes
    }
}

fn log_outcome(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Success { page, records, .. } => {
            tracing::debug!(page, records = records.len(), "Page fetched");
        }
        FetchOutcome::Failure {
            page,
            reason: FetchError::Cancelled,
        } => {
            tracing::debug!(page, "Page cancelled");
        }
        FetchOutcome::Failure { page, reason } => {
            tracing::warn!(page, code = reason.code(), error = %reason, "Page failed");
        }
    }
}
