//! Multi-source search aggregation.
//!
//! The aggregator fans one query out to every filter-matching source in
//! registry order, throttling the *launch* of successive calls while letting
//! launched calls run concurrently, and waits for all of them to settle. A
//! single source failing never aborts its siblings: failures are collected
//! alongside the successful groups and reported together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yomu::client::ApiClient;
//! use yomu::config::Config;
//! use yomu::registry::SourceRegistry;
//! use yomu::search::SearchAggregator;
//!
//! # async fn example() -> yomu::Result<()> {
//! let config = Config::from_env()?;
//! let api = Arc::new(ApiClient::new(&config)?);
//! let registry = SourceRegistry::load(api.as_ref()).await?;
//!
//! let aggregator = SearchAggregator::new(api, &config);
//! let outcome = aggregator.search(&registry, &"one piece".into()).await?;
//!
//! println!("{} hits, {}", outcome.merged().len(), outcome.summary());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::future;

use crate::client::ServerApi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::SourceRegistry;
use crate::types::{SearchHit, SearchRequest, SourceInfo};

/// Fans a search out across the registry and merges the settled results.
pub struct SearchAggregator {
    api: Arc<dyn ServerApi>,
    dispatch_delay: Duration,
}

/// Results of one aggregate search: per-source groups plus a failure report.
///
/// Groups appear in registry order and keep each source's own result order.
/// No cross-source deduplication is applied here; two sources may
/// legitimately return the same title. Empty groups with a non-empty failure
/// list is a valid outcome, not an error.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Sources that answered successfully, in registry order.
    pub groups: Vec<SourceResults>,
    /// Exactly one entry per source that failed.
    pub failures: Vec<SourceFailure>,
    /// Number of sources the search was dispatched to.
    pub dispatched: usize,
}

/// One source's successful contribution to a search.
#[derive(Debug)]
pub struct SourceResults {
    pub source: SourceInfo,
    pub hits: Vec<SearchHit>,
}

/// One source's failure, contained and attributed.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_id: String,
    pub source_name: String,
    pub error: Error,
}

impl SearchOutcome {
    /// Concatenates all successful hits, preserving per-source grouping and
    /// each source's internal order.
    pub fn merged(&self) -> Vec<SearchHit> {
        self.groups.iter().flat_map(|g| g.hits.iter().cloned()).collect()
    }

    /// Returns `true` when no source produced any hit.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.hits.is_empty())
    }

    /// Short failure summary in the form users see: `"2 of 17 sources failed"`.
    pub fn summary(&self) -> String {
        format!("{} of {} sources failed", self.failures.len(), self.dispatched)
    }
}

/// Post-processing helpers for merged hit lists.
pub trait SearchHitExt {
    /// Removes duplicate titles case-insensitively, keeping first occurrence.
    ///
    /// The grouped view is never deduplicated; this is an opt-in presentation
    /// helper applied to the merged list before it is rendered.
    fn dedupe_by_title(self) -> Self;
}

impl SearchHitExt for Vec<SearchHit> {
    fn dedupe_by_title(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.retain(|hit| seen.insert(hit.title.to_lowercase()));
        self
    }
}

impl SearchAggregator {
    /// Creates an aggregator using the configured inter-dispatch delay.
    pub fn new(api: Arc<dyn ServerApi>, config: &Config) -> Self {
        Self {
            api,
            dispatch_delay: config.dispatch_delay,
        }
    }

    /// Runs one aggregate search.
    ///
    /// Validates the request before any network call, dispatches one search
    /// per filter-matching source in registry order with the configured delay
    /// between launches, and waits for every call to settle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty query or a per-source limit
    /// outside 1..=10. Individual source failures do not produce an error;
    /// they are reported in the outcome's failure list.
    pub async fn search(
        &self,
        registry: &SourceRegistry,
        request: &SearchRequest,
    ) -> Result<SearchOutcome> {
        if request.query.trim().is_empty() {
            return Err(Error::validation("search query must not be empty"));
        }
        if !(1..=10).contains(&request.limit) {
            return Err(Error::validation(format!(
                "per-source limit must be in 1..=10, got {}",
                request.limit
            )));
        }

        let targets: Vec<SourceInfo> =
            registry.list(request.include_adult).cloned().collect();

        tracing::debug!(
            query = %request.query,
            sources = targets.len(),
            "dispatching aggregate search"
        );

        // Stagger launches; once launched, calls run concurrently.
        let mut handles = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.dispatch_delay).await;
            }
            let api = Arc::clone(&self.api);
            let source_id = target.id.clone();
            let query = request.query.clone();
            handles.push(tokio::spawn(async move {
                api.search_source(&source_id, &query).await
            }));
        }

        let settled = future::join_all(handles).await;

        let mut groups = Vec::new();
        let mut failures = Vec::new();
        for (target, joined) in targets.iter().zip(settled) {
            let result = joined
                .unwrap_or_else(|e| Err(Error::api(format!("search task panicked: {e}"))));
            match result {
                Ok(mut hits) => {
                    hits.truncate(request.limit);
                    groups.push(SourceResults {
                        source: target.clone(),
                        hits,
                    });
                }
                Err(error) => {
                    tracing::warn!(source = %target.id, %error, "source search failed");
                    failures.push(SourceFailure {
                        source_id: target.id.clone(),
                        source_name: target.name.clone(),
                        error,
                    });
                }
            }
        }

        Ok(SearchOutcome {
            groups,
            failures,
            dispatched: targets.len(),
        })
    }
}
