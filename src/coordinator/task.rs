//! One page task: wait for a concurrency permit, fetch, report once.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::fetcher::PageFetcher;
use crate::types::{FetchOutcome, PageRequest};

/// Everything one page task owns.
pub(super) struct PageTaskContext {
    pub(super) request: PageRequest,
    pub(super) fetcher: Arc<dyn PageFetcher>,
    /// Shared concurrency cap (None = unbounded)
    pub(super) limiter: Option<Arc<Semaphore>>,
    pub(super) cancel_token: CancellationToken,
    /// Collection point; each task sends exactly one outcome
    pub(super) outcome_tx: mpsc::Sender<FetchOutcome>,
}

/// Produce this page's outcome and hand it to the coordinator.
pub(super) async fn run_page_task(ctx: PageTaskContext) {
    let page = ctx.request.page();
    let outcome = fetch_within_limits(&ctx).await;
    if ctx.outcome_tx.send(outcome).await.is_err() {
        tracing::debug!(page, "Coordinator no longer collecting, outcome dropped");
    }
}

async fn fetch_within_limits(ctx: &PageTaskContext) -> FetchOutcome {
    let page = ctx.request.page();

    // Hold the permit until the fetch finishes
    let _permit = match &ctx.limiter {
        Some(limiter) => {
            tokio::select! {
                biased;
                _ = ctx.cancel_token.cancelled() => return FetchOutcome::cancelled(page),
                permit = Arc::clone(limiter).acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => return FetchOutcome::cancelled(page),
                },
            }
        }
        None => None,
    };

    if ctx.cancel_token.is_cancelled() {
        return FetchOutcome::cancelled(page);
    }

    let fetch = AssertUnwindSafe(ctx.fetcher.fetch(&ctx.request)).catch_unwind();
    tokio::select! {
        biased;
        _ = ctx.cancel_token.cancelled() => {
            tracing::debug!(page, "In-flight fetch aborted by cancellation");
            FetchOutcome::cancelled(page)
        }
        result = fetch => match result {
            Ok(outcome) if outcome.page() == page => outcome,
            Ok(outcome) => FetchOutcome::Failure {
                page,
                reason: FetchError::TaskFailed(format!(
                    "fetcher reported page {} for page {page}",
                    outcome.page()
                )),
            },
            Err(payload) => FetchOutcome::Failure {
                page,
                reason: FetchError::TaskFailed(panic_message(payload.as_ref())),
            },
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
