//! Source registry: the ordered set of backend sources a search fans out to.
//!
//! The registry is loaded once (either from the server or from configuration)
//! and is immutable for the process lifetime. Sources keep their load order so
//! that result merging and presentation are reproducible across runs.
//!
//! # Examples
//!
//! ```rust
//! use yomu::registry::SourceRegistry;
//! use yomu::types::SourceInfo;
//!
//! let registry = SourceRegistry::from_sources(vec![SourceInfo {
//!     id: "mangadex".into(),
//!     name: "MangaDex".into(),
//!     lang: "en".into(),
//!     nsfw: false,
//!     enabled: true,
//!     supports_latest: true,
//! }]);
//!
//! assert_eq!(registry.list(false).count(), 1);
//! ```

use crate::client::ServerApi;
use crate::error::Result;
use crate::types::SourceInfo;

/// An ordered, immutable collection of backend sources.
pub struct SourceRegistry {
    sources: Vec<SourceInfo>,
}

impl SourceRegistry {
    /// Builds a registry from an explicit source list, preserving its order.
    pub fn from_sources(sources: Vec<SourceInfo>) -> Self {
        Self { sources }
    }

    /// Loads the registry from the server's installed source list.
    ///
    /// Server order becomes registry order. The list is fetched once; the
    /// registry does not refresh itself afterwards.
    pub async fn load(api: &dyn ServerApi) -> Result<Self> {
        let sources = api.server_sources().await?;
        tracing::info!(count = sources.len(), "loaded source registry");
        Ok(Self { sources })
    }

    /// Returns the filter-matching sources in registry order.
    ///
    /// Disabled sources are always skipped; adult-flagged sources are skipped
    /// unless `include_adult` is set. Pure predicate, no network access.
    pub fn list(&self, include_adult: bool) -> impl Iterator<Item = &SourceInfo> {
        self.sources
            .iter()
            .filter(move |s| s.enabled && (include_adult || !s.nsfw))
    }

    /// Looks a source up by id.
    pub fn get(&self, id: &str) -> Option<&SourceInfo> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Returns the total number of configured sources, including filtered ones.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if the registry holds no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
