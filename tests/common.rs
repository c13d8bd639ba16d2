//! Common test utilities
//!
//! A scripted in-memory `ServerApi` implementation plus helpers shared across
//! all test modules.
// Common test utilities - all must be public

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use url::Url;

use yomu::client::ServerApi;
use yomu::config::Config;
use yomu::error::{Error, Result};
use yomu::types::{
    BrowseKind, ChapterRef, LibraryStats, MangaDetail, QueueSnapshot, SearchHit, SourceInfo,
    UpdateCheck,
};

/// One recorded API call with the (tokio) instant it was received.
#[derive(Debug, Clone)]
pub struct Call {
    pub op: String,
    pub at: Instant,
}

/// Per-source script for `search_source`.
pub enum SearchPlan {
    /// Answer immediately with these hits.
    Hits(Vec<SearchHit>),
    /// Sleep, then answer with these hits.
    Slow(Duration, Vec<SearchHit>),
    /// Fail with a server error.
    Fail,
}

/// Scripted `ServerApi` double.
///
/// Behavior is configured through public fields before the mock is wrapped in
/// an `Arc`; every call is recorded with its arrival instant so tests can
/// assert ordering and pacing under `start_paused` time.
pub struct MockApi {
    pub sources: Vec<SourceInfo>,
    pub search_plans: HashMap<String, SearchPlan>,
    pub browse_results: HashMap<String, Vec<SearchHit>>,
    pub update: UpdateCheck,
    pub chapters: Vec<ChapterRef>,
    pub fail_detail: bool,
    pub fail_add: bool,
    pub fail_chapters: bool,
    /// Zero-based enqueue-call indexes that should fail.
    pub failing_batches: Vec<usize>,
    pub snapshot: QueueSnapshot,
    pub stats: LibraryStats,
    /// When non-empty, each stats call consumes the next scripted outcome in
    /// order (`None` means fail) before falling back to `stats`.
    pub stats_script: Mutex<Vec<Option<LibraryStats>>>,
    /// Artificial latency applied to every stats call.
    pub stats_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    enqueue_calls: AtomicUsize,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            search_plans: HashMap::new(),
            browse_results: HashMap::new(),
            update: UpdateCheck::default(),
            chapters: Vec::new(),
            fail_detail: false,
            fail_add: false,
            fail_chapters: false,
            failing_batches: Vec::new(),
            snapshot: QueueSnapshot {
                running: false,
                items: Vec::new(),
            },
            stats: LibraryStats::default(),
            stats_script: Mutex::new(Vec::new()),
            stats_delay: None,
            calls: Mutex::new(Vec::new()),
            enqueue_calls: AtomicUsize::new(0),
        }
    }
}

#[allow(dead_code)]
impl MockApi {
    pub fn record(&self, op: impl Into<String>) {
        self.calls.lock().unwrap().push(Call {
            op: op.into(),
            at: Instant::now(),
        });
    }

    /// All recorded calls in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls whose op starts with the given prefix.
    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.op.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl ServerApi for MockApi {
    async fn server_sources(&self) -> Result<Vec<SourceInfo>> {
        self.record("sources");
        Ok(self.sources.clone())
    }

    async fn search_source(&self, source_id: &str, _query: &str) -> Result<Vec<SearchHit>> {
        self.record(format!("search:{source_id}"));
        match self.search_plans.get(source_id) {
            Some(SearchPlan::Hits(hits)) => Ok(hits.clone()),
            Some(SearchPlan::Slow(delay, hits)) => {
                tokio::time::sleep(*delay).await;
                Ok(hits.clone())
            }
            Some(SearchPlan::Fail) => Err(Error::api(format!("source {source_id} unavailable"))),
            None => Ok(Vec::new()),
        }
    }

    async fn browse_source(&self, source_id: &str, kind: BrowseKind) -> Result<Vec<SearchHit>> {
        self.record(format!("browse:{kind:?}:{source_id}"));
        Ok(self.browse_results.get(source_id).cloned().unwrap_or_default())
    }

    async fn manga_detail(&self, manga_id: i64) -> Result<MangaDetail> {
        self.record(format!("detail:{manga_id}"));
        if self.fail_detail {
            return Err(Error::api("detail unavailable"));
        }
        Ok(detail(manga_id))
    }

    async fn add_to_library(&self, manga_id: i64) -> Result<()> {
        self.record(format!("add:{manga_id}"));
        if self.fail_add {
            return Err(Error::api("library add rejected"));
        }
        Ok(())
    }

    async fn chapters(&self, manga_id: i64) -> Result<Vec<ChapterRef>> {
        self.record(format!("chapters:{manga_id}"));
        if self.fail_chapters {
            return Err(Error::api("chapter list unavailable"));
        }
        Ok(self.chapters.clone())
    }

    async fn enqueue_downloads(&self, chapter_ids: &[i64]) -> Result<()> {
        let index = self.enqueue_calls.fetch_add(1, Ordering::SeqCst);
        self.record(format!(
            "enqueue:{}:{}",
            chapter_ids.len(),
            chapter_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ));
        if self.failing_batches.contains(&index) {
            return Err(Error::api("downloader rejected batch"));
        }
        Ok(())
    }

    async fn download_status(&self) -> Result<QueueSnapshot> {
        self.record("status");
        Ok(self.snapshot.clone())
    }

    async fn library_stats(&self) -> Result<LibraryStats> {
        self.record("stats");
        if let Some(delay) = self.stats_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = {
            let mut script = self.stats_script.lock().unwrap();
            if script.is_empty() { None } else { Some(script.remove(0)) }
        };
        match scripted {
            Some(Some(stats)) => Ok(stats),
            Some(None) => Err(Error::api("stats query failed")),
            None => Ok(self.stats),
        }
    }

    async fn update_check(&self, limit: usize) -> Result<UpdateCheck> {
        self.record(format!("updates:{limit}"));
        Ok(self.update.clone())
    }
}

/// Installs a test subscriber once so failing tests show pipeline tracing.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config pointing at a dummy endpoint with the production defaults.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config::new(Url::parse("http://localhost:4567").unwrap(), "test-token")
}

#[allow(dead_code)]
pub fn source(id: &str, nsfw: bool) -> SourceInfo {
    SourceInfo {
        id: id.to_string(),
        name: id.to_uppercase(),
        lang: "en".to_string(),
        nsfw,
        enabled: true,
        supports_latest: true,
    }
}

#[allow(dead_code)]
pub fn hit(source_id: &str, manga_id: i64, title: &str) -> SearchHit {
    SearchHit {
        source_id: source_id.to_string(),
        manga_id,
        title: title.to_string(),
        cover_url: None,
        author: None,
        status: None,
        in_library: false,
    }
}

#[allow(dead_code)]
pub fn detail(manga_id: i64) -> MangaDetail {
    MangaDetail {
        id: manga_id,
        title: format!("Manga {manga_id}"),
        author: Some("Author".to_string()),
        artist: None,
        description: None,
        genres: vec!["Action".to_string()],
        status: "ONGOING".to_string(),
        thumbnail_url: None,
        in_library: false,
        chapter_count: 0,
    }
}

#[allow(dead_code)]
pub fn chapter(id: i64, number: f64) -> ChapterRef {
    ChapterRef {
        id,
        number,
        name: format!("Chapter {number}"),
    }
}
