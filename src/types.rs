//! Core data types for sources, search results, and queue state.
//!
//! This module defines the records that flow through the pipeline:
//!
//! - [`SourceInfo`] - one queryable backend source, owned by the registry
//! - [`SearchHit`] - one candidate from one source's search response
//! - [`MangaDetail`] - full metadata fetched after a selection is made
//! - [`QueueSnapshot`] - one consistent read of the remote download queue
//! - [`UpdateCheck`] - one consistent read of library update progress
//! - [`LibraryStats`] - aggregate library counters for the status poller
//! - [`SearchRequest`] - validated input for an aggregate search
//!
//! Manga and chapter identifiers are the server's integer ids; source
//! identifiers are the server's opaque "long string" ids.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// One independently-queryable backend content provider.
///
/// Loaded once at startup and immutable for the process lifetime; ordering of
/// sources is the registry's load order and is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Server-assigned source identifier.
    pub id: String,
    /// Human-readable name shown next to results.
    pub name: String,
    /// ISO language code reported by the source extension.
    pub lang: String,
    /// Adult-content flag; filtered out of searches unless opted in.
    pub nsfw: bool,
    /// Disabled sources are skipped by every aggregate search.
    pub enabled: bool,
    /// Whether the source supports latest-listing browsing.
    pub supports_latest: bool,
}

/// Which per-source listing a browse fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowseKind {
    /// Most recently updated entries; only meaningful for sources with
    /// [`SourceInfo::supports_latest`] set.
    Latest,
    /// The source's popularity ranking.
    Popular,
}

/// One search candidate as returned by a single source.
///
/// Created per search call and discarded when the selection session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identifier of the source this hit came from.
    pub source_id: String,
    /// Server-side manga id, usable for detail fetches and library adds.
    pub manga_id: i64,
    /// Main title.
    pub title: String,
    /// Cover image URL, when the source provides one.
    pub cover_url: Option<String>,
    /// Author, when known at search time.
    pub author: Option<String>,
    /// Publication status string as reported by the server.
    pub status: Option<String>,
    /// Whether the manga is already in the library.
    pub in_library: bool,
}

/// Full metadata for one manga, fetched lazily after a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaDetail {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub in_library: bool,
    /// Total chapter count reported by the server.
    pub chapter_count: u64,
}

/// One chapter reference used for download submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRef {
    pub id: i64,
    pub number: f64,
    pub name: String,
}

/// A single consistent read of the remote download queue.
///
/// Recomputed fresh on every status query; never a merge of two reads taken at
/// different times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Whether the server-side downloader is currently running.
    pub running: bool,
    /// In-flight items in the order the server reports them.
    pub items: Vec<QueueItem>,
}

/// One in-flight download in a [`QueueSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub manga_title: String,
    pub chapter_title: String,
    /// Completion percentage, clamped to 0..=100.
    pub percent: u8,
}

/// Library update progress plus the most recently fetched chapters.
///
/// One fresh read per call, like [`QueueSnapshot`]; the job counters reflect
/// the server-side update run at the moment of the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCheck {
    /// Whether a library update run is in progress.
    pub running: bool,
    pub running_jobs: u64,
    pub pending_jobs: u64,
    pub complete_jobs: u64,
    pub failed_jobs: u64,
    /// Most recently fetched chapters, newest first as the server reports them.
    pub recent_chapters: Vec<RecentChapter>,
}

/// One recently fetched chapter in an [`UpdateCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentChapter {
    pub manga_title: String,
    pub name: String,
    pub number: f64,
    pub is_read: bool,
}

/// Aggregate library counters published by the status poller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_manga: u64,
    pub library_manga: u64,
    pub total_chapters: u64,
    pub unread_chapters: u64,
    pub downloaded_chapters: u64,
}

impl LibraryStats {
    /// Renders the short human-readable presence string.
    ///
    /// ```rust
    /// use yomu::types::LibraryStats;
    ///
    /// let stats = LibraryStats { library_manga: 42, unread_chapters: 7, ..Default::default() };
    /// assert_eq!(stats.presence_line(), "42 manga | 7 unread");
    /// ```
    pub fn presence_line(&self) -> String {
        format!("{} manga | {} unread", self.library_manga, self.unread_chapters)
    }
}

/// Parameters for one aggregate search.
///
/// Built with the generated `SearchRequestBuilder` or converted from a query
/// string; validated by the aggregator before any network call.
///
/// ```rust
/// use yomu::types::SearchRequestBuilder;
///
/// let request = SearchRequestBuilder::default()
///     .query("one piece".to_string())
///     .limit(5usize)
///     .build()
///     .unwrap();
/// assert_eq!(request.limit, 5);
/// assert!(!request.include_adult);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct SearchRequest {
    /// Free-text query forwarded to every source.
    pub query: String,
    /// Maximum results kept per source, in 1..=10.
    #[builder(default = "5")]
    pub limit: usize,
    /// Whether adult-flagged sources are included in the fan-out.
    #[builder(default)]
    pub include_adult: bool,
}

impl From<&str> for SearchRequest {
    fn from(query: &str) -> Self {
        SearchRequest {
            query: query.to_string(),
            limit: 5,
            include_adult: false,
        }
    }
}

impl From<String> for SearchRequest {
    fn from(query: String) -> Self {
        SearchRequest {
            query,
            limit: 5,
            include_adult: false,
        }
    }
}
