//! Merging page outcomes into one result set

use crate::config::MergeOrder;
use crate::types::{AggregateResult, FetchOutcome};

/// Merge page outcomes into an [`AggregateResult`].
///
/// With [`MergeOrder::Arrival`] records keep the iteration order of
/// `outcomes`; with [`MergeOrder::PageIndex`] they are grouped by ascending
/// page index. The multiset of records does not depend on input order.
pub fn aggregate<I>(outcomes: I, order: MergeOrder) -> AggregateResult
where
    I: IntoIterator<Item = FetchOutcome>,
{
    let mut batches = Vec::new();
    let mut result = AggregateResult::default();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Success {
                page,
                found,
                records,
            } => {
                result.succeeded_pages.insert(page);
                result.reported_total = result.reported_total.max(Some(found));
                batches.push((page, records));
            }
            FetchOutcome::Failure { page, reason } => {
                result.failed_pages.insert(page, reason);
            }
        }
    }

    if order == MergeOrder::PageIndex {
        // Stable: equal indices keep arrival order
        batches.sort_by_key(|(page, _)| *page);
    }

    let total: usize = batches.iter().map(|(_, records)| records.len()).sum();
    result.records.reserve_exact(total);
    for (_, records) in batches {
        result.records.extend(records);
    }

    result
}
