//! Query execution: ask the remote source first, fall back to ranked local filtering
//! over the pre-loaded corpus when it cannot answer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::rank::fallback_search;
use crate::remote::SearchSource;
use crate::types::Location;

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct SearchOutput {
    pub locations: Vec<Location>,
    pub origin: ResultOrigin,
}

pub struct QueryExecutor {
    source: Option<Arc<dyn SearchSource>>,
    dataset: Arc<[Location]>,
    max_results: usize,
    enable_fallback: bool,
}

impl QueryExecutor {
    pub fn new(
        source: Option<Arc<dyn SearchSource>>,
        dataset: Arc<[Location]>,
        max_results: usize,
        enable_fallback: bool,
    ) -> Self {
        Self { source, dataset, max_results, enable_fallback }
    }

    /// Executor with no remote source: every query is answered locally.
    pub fn offline(dataset: Arc<[Location]>, max_results: usize) -> Self {
        Self::new(None, dataset, max_results, true)
    }

    pub fn dataset(&self) -> &[Location] {
        &self.dataset
    }

    /// Run one search. Cancelling `cancel` aborts the remote call and yields
    /// [`SearchError::Cancelled`]; a cancelled search never falls back.
    pub async fn execute(&self, query: &str, cancel: &CancellationToken) -> Result<SearchOutput> {
        let Some(source) = &self.source else {
            debug!(query, "No remote source configured, searching locally");
            return Ok(self.local(query));
        };

        let remote = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            result = source.search(query, self.max_results) => result,
        };

        match remote {
            Ok(mut locations) => {
                locations.truncate(self.max_results);
                Ok(SearchOutput { locations, origin: ResultOrigin::Remote })
            }
            Err(e) if e.is_unavailable() && self.enable_fallback => {
                warn!(error = %e, query, "Remote search failed, falling back to local search");
                Ok(self.local(query))
            }
            Err(e) => Err(e),
        }
    }

    fn local(&self, query: &str) -> SearchOutput {
        SearchOutput {
            locations: fallback_search(&self.dataset, query, self.max_results),
            origin: ResultOrigin::Fallback,
        }
    }
}
