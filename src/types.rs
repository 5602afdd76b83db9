//! Core types for vacancy-fetch

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::decoder::{Vacancy, VacancyPage};
use crate::error::FetchError;

/// One page to fetch. Built by the coordinator and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
    query: Arc<str>,
}

impl PageRequest {
    /// Create a request for page `page` of `query`, `per_page` records each.
    ///
    /// `per_page` is expected to be non-zero; the coordinator checks this
    /// before building any request.
    pub fn new(page: u32, per_page: u32, query: impl Into<Arc<str>>) -> Self {
        Self {
            page,
            per_page,
            query: query.into(),
        }
    }

    /// Zero-based page index
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Search text
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Raw HTTP result of a single page request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageResponse {
    /// HTTP status code
    pub status: u16,
    /// Entire response body (empty when the body was not read)
    pub body: Vec<u8>,
}

/// Terminal result of one page task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and decoded
    Success {
        /// Page index this outcome belongs to
        page: u32,
        /// Total matches the server reported for the search
        found: u64,
        /// Vacancies on the page
        records: Vec<Vacancy>,
    },
    /// The page could not be fetched or decoded
    Failure {
        /// Page index this outcome belongs to
        page: u32,
        /// Classified reason
        reason: FetchError,
    },
}

impl FetchOutcome {
    /// Tag a fetch result with its page index.
    pub fn from_result(page: u32, result: Result<VacancyPage, FetchError>) -> Self {
        match result {
            Ok(decoded) => FetchOutcome::Success {
                page,
                found: decoded.found,
                records: decoded.items,
            },
            Err(reason) => FetchOutcome::Failure { page, reason },
        }
    }

    /// Failure outcome for a page that was cancelled.
    pub fn cancelled(page: u32) -> Self {
        FetchOutcome::Failure {
            page,
            reason: FetchError::Cancelled,
        }
    }

    /// Page index this outcome belongs to
    pub fn page(&self) -> u32 {
        match self {
            FetchOutcome::Success { page, .. } | FetchOutcome::Failure { page, .. } => *page,
        }
    }

    /// Whether the page succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Everything a run produced
///
/// Every requested page index appears in exactly one of `succeeded_pages`
/// or `failed_pages`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Records from all successful pages
    pub records: Vec<Vacancy>,
    /// Indices of pages that decoded successfully (possibly with zero records)
    pub succeeded_pages: BTreeSet<u32>,
    /// Indices of pages that failed, with the reason
    pub failed_pages: BTreeMap<u32, FetchError>,
    /// Largest `found` reported by any successful page
    pub reported_total: Option<u64>,
}

impl AggregateResult {
    /// Number of pages accounted for (succeeded + failed)
    pub fn page_count(&self) -> usize {
        self.succeeded_pages.len() + self.failed_pages.len()
    }

    /// Indices of failed pages
    pub fn failed_page_indices(&self) -> BTreeSet<u32> {
        self.failed_pages.keys().copied().collect()
    }

    /// True when no page failed
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }

    /// True when pages were requested and every one of them failed
    pub fn all_failed(&self) -> bool {
        self.succeeded_pages.is_empty() && !self.failed_pages.is_empty()
    }

    /// Sort records by vacancy id. Arrival-order runs are not deterministic;
    /// call this before comparing or printing when a stable order matters.
    pub fn sort_records_by_id(&mut self) {
        self.records.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched {} records from {}/{} pages",
            self.records.len(),
            self.succeeded_pages.len(),
            self.page_count()
        )?;
        if let Some(total) = self.reported_total {
            write!(f, " (server reports {total} matches)")?;
        }
        if self.failed_pages.is_empty() {
            return Ok(());
        }
        write!(f, "\nfailed pages:")?;
        for (page, reason) in &self.failed_pages {
            write!(f, "\n  page {page}: {reason}")?;
        }
        Ok(())
    }
}
