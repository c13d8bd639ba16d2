//! GraphQL transport for the Suwayomi server API.
//!
//! This module provides the networking infrastructure for yomu:
//!
//! - **[`ApiClient`]**: a pooled, keep-alive HTTP client that executes
//!   bearer-authenticated GraphQL operations against one configured endpoint
//! - **Retry Logic**: exponential backoff for transient failures; auth and
//!   decode failures are surfaced immediately
//! - **[`ServerApi`]**: the typed operation surface the rest of the pipeline
//!   is written against, so components can be exercised without a server
//!
//! The client itself imposes no throttling beyond its connection pool; call
//! spacing is the responsibility of the aggregator and orchestrator.
//!
//! # Examples
//!
//! ```rust,no_run
//! use yomu::client::{ApiClient, ServerApi};
//! use yomu::config::Config;
//!
//! # async fn example() -> yomu::Result<()> {
//! let config = Config::from_env()?;
//! let client = ApiClient::new(&config)?;
//!
//! let stats = client.library_stats().await?;
//! println!("{} manga in library", stats.library_manga);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{
    BrowseKind, ChapterRef, LibraryStats, MangaDetail, QueueItem, QueueSnapshot, RecentChapter,
    SearchHit, SourceInfo, UpdateCheck,
};

/// Base delay for exponential retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Upper bound on in-flight requests for [`ApiClient::execute_many`].
const MAX_CONCURRENT_REQUESTS: usize = 5;

// GraphQL operation documents. Operation names follow the server schema;
// everything the pipeline needs from the server goes through one of these.

const OP_LIST_SOURCES: &str = r#"
query ListSources {
    sources {
        nodes {
            id
            displayName
            lang
            isNsfw
            supportsLatest
        }
    }
}"#;

const OP_SEARCH_SOURCE: &str = r#"
mutation SearchSource($sourceId: LongString!, $query: String!) {
    fetchSourceManga(input: { sourceId: $sourceId, type: SEARCH, query: $query }) {
        mangas {
            id
            title
            thumbnailUrl
            author
            status
            inLibrary
        }
    }
}"#;

const OP_BROWSE_LATEST: &str = r#"
mutation GetLatest($sourceId: LongString!) {
    fetchSourceManga(input: { sourceId: $sourceId, type: LATEST }) {
        mangas {
            id
            title
            thumbnailUrl
            author
            status
            inLibrary
        }
    }
}"#;

const OP_BROWSE_POPULAR: &str = r#"
mutation GetPopular($sourceId: LongString!) {
    fetchSourceManga(input: { sourceId: $sourceId, type: POPULAR }) {
        mangas {
            id
            title
            thumbnailUrl
            author
            status
            inLibrary
        }
    }
}"#;

const OP_MANGA_DETAIL: &str = r#"
query GetMangaDetails($id: Int!) {
    manga(id: $id) {
        id
        title
        author
        artist
        description
        status
        genre
        thumbnailUrl
        inLibrary
        chapters {
            totalCount
        }
    }
}"#;

const OP_ADD_TO_LIBRARY: &str = r#"
mutation AddToLibrary($id: Int!) {
    updateManga(input: { id: $id, patch: { inLibrary: true, updateStrategy: ALWAYS_UPDATE } }) {
        manga {
            id
            inLibrary
        }
    }
}"#;

const OP_LIST_CHAPTERS: &str = r#"
query GetChapters($mangaId: Int!) {
    manga(id: $mangaId) {
        chapters {
            nodes {
                id
                chapterNumber
                name
            }
        }
    }
}"#;

const OP_ENQUEUE_DOWNLOADS: &str = r#"
mutation DownloadChapters($chapterIds: [Int!]!) {
    enqueueChapterDownloads(input: { chapterIds: $chapterIds }) {
        downloadStatus {
            state
        }
    }
}"#;

const OP_DOWNLOAD_STATUS: &str = r#"
query DownloadStatus {
    downloadStatus {
        state
        queue {
            progress
            chapter {
                name
                manga {
                    title
                }
            }
        }
    }
}"#;

const OP_UPDATE_CHECK: &str = r#"
query UpdateInfo($limit: Int!) {
    updateStatus {
        isRunning
        completeJobs {
            mangas {
                id
            }
        }
        runningJobs {
            mangas {
                id
            }
        }
        pendingJobs {
            mangas {
                id
            }
        }
        failedJobs {
            mangas {
                id
            }
        }
    }
    chapters(first: $limit) {
        nodes {
            name
            chapterNumber
            isRead
            manga {
                title
            }
        }
    }
}"#;

const OP_LIBRARY_STATS: &str = r#"
query LibraryStats {
    mangas {
        totalCount
    }
    libraryMangas: mangas(filter: { inLibrary: { equalTo: true } }) {
        totalCount
    }
    chapters {
        totalCount
    }
    unreadChapters: chapters(filter: { isRead: { equalTo: false } }) {
        totalCount
    }
    downloadedChapters: chapters(filter: { isDownloaded: { equalTo: true } }) {
        totalCount
    }
}"#;

const OP_ABOUT_SERVER: &str = r#"
query AboutServer {
    aboutServer {
        name
        version
    }
}"#;

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GqlResponse {
    data: Option<Value>,
    errors: Option<Vec<GqlError>>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

// Wire records the operations above decode into. These mirror the server
// schema field names and stay private to this module; the pipeline only sees
// the types from `crate::types`.

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TotalCount {
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct WireSources {
    sources: Nodes<WireSource>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    lang: String,
    #[serde(rename = "isNsfw")]
    is_nsfw: bool,
    #[serde(rename = "supportsLatest", default)]
    supports_latest: bool,
}

#[derive(Debug, Deserialize)]
struct WireSearch {
    #[serde(rename = "fetchSourceManga")]
    fetch_source_manga: WireSearchPage,
}

#[derive(Debug, Deserialize)]
struct WireSearchPage {
    mangas: Vec<WireSearchManga>,
}

#[derive(Debug, Deserialize)]
struct WireSearchManga {
    id: i64,
    title: String,
    #[serde(rename = "thumbnailUrl")]
    thumbnail_url: Option<String>,
    author: Option<String>,
    status: Option<String>,
    #[serde(rename = "inLibrary", default)]
    in_library: bool,
}

#[derive(Debug, Deserialize)]
struct WireMangaEnvelope {
    manga: WireManga,
}

#[derive(Debug, Deserialize)]
struct WireManga {
    id: i64,
    title: String,
    author: Option<String>,
    artist: Option<String>,
    description: Option<String>,
    status: String,
    #[serde(default)]
    genre: Vec<String>,
    #[serde(rename = "thumbnailUrl")]
    thumbnail_url: Option<String>,
    #[serde(rename = "inLibrary", default)]
    in_library: bool,
    chapters: TotalCount,
}

#[derive(Debug, Deserialize)]
struct WireUpdateManga {
    #[serde(rename = "updateManga")]
    update_manga: WireUpdatedManga,
}

#[derive(Debug, Deserialize)]
struct WireUpdatedManga {
    manga: WireLibraryFlag,
}

#[derive(Debug, Deserialize)]
struct WireLibraryFlag {
    #[serde(rename = "inLibrary")]
    in_library: bool,
}

#[derive(Debug, Deserialize)]
struct WireChapterList {
    manga: WireChapterNodes,
}

#[derive(Debug, Deserialize)]
struct WireChapterNodes {
    chapters: Nodes<WireChapter>,
}

#[derive(Debug, Deserialize)]
struct WireChapter {
    id: i64,
    #[serde(rename = "chapterNumber")]
    chapter_number: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireDownloadStatusEnvelope {
    #[serde(rename = "downloadStatus")]
    download_status: WireDownloadStatus,
}

#[derive(Debug, Deserialize)]
struct WireDownloadStatus {
    state: String,
    queue: Vec<WireQueueItem>,
}

#[derive(Debug, Deserialize)]
struct WireQueueItem {
    progress: f64,
    chapter: WireQueueChapter,
}

#[derive(Debug, Deserialize)]
struct WireQueueChapter {
    name: String,
    manga: WireQueueManga,
}

#[derive(Debug, Deserialize)]
struct WireQueueManga {
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireUpdateEnvelope {
    #[serde(rename = "updateStatus")]
    update_status: WireUpdateStatus,
    chapters: Nodes<WireRecentChapter>,
}

#[derive(Debug, Deserialize)]
struct WireUpdateStatus {
    #[serde(rename = "isRunning")]
    is_running: bool,
    #[serde(rename = "runningJobs")]
    running_jobs: WireUpdateJobs,
    #[serde(rename = "pendingJobs")]
    pending_jobs: WireUpdateJobs,
    #[serde(rename = "completeJobs")]
    complete_jobs: WireUpdateJobs,
    #[serde(rename = "failedJobs")]
    failed_jobs: WireUpdateJobs,
}

// Only the bucket sizes matter; the job payloads are left undecoded.
#[derive(Debug, Deserialize)]
struct WireUpdateJobs {
    mangas: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireRecentChapter {
    name: String,
    #[serde(rename = "chapterNumber")]
    chapter_number: f64,
    #[serde(rename = "isRead")]
    is_read: bool,
    manga: WireQueueManga,
}

#[derive(Debug, Deserialize)]
struct WireLibraryStats {
    mangas: TotalCount,
    #[serde(rename = "libraryMangas")]
    library_mangas: TotalCount,
    chapters: TotalCount,
    #[serde(rename = "unreadChapters")]
    unread_chapters: TotalCount,
    #[serde(rename = "downloadedChapters")]
    downloaded_chapters: TotalCount,
}

#[derive(Debug, Deserialize)]
struct WireAboutEnvelope {
    #[serde(rename = "aboutServer")]
    about_server: ServerAbout,
}

/// Server name and version from the `aboutServer` query.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAbout {
    pub name: String,
    pub version: String,
}

/// The typed operation surface the pipeline components are written against.
///
/// [`ApiClient`] is the production implementation; tests substitute their own.
/// Every method is a single server round trip with a bounded wait.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Lists the sources installed on the server, in server order.
    async fn server_sources(&self) -> Result<Vec<SourceInfo>>;

    /// Runs one search against one source.
    async fn search_source(&self, source_id: &str, query: &str) -> Result<Vec<SearchHit>>;

    /// Fetches one source's latest or popular listing.
    ///
    /// Latest browsing is only meaningful for sources whose
    /// [`SourceInfo::supports_latest`] flag is set; the server rejects it for
    /// the rest.
    async fn browse_source(&self, source_id: &str, kind: BrowseKind) -> Result<Vec<SearchHit>>;

    /// Fetches full metadata for one manga.
    async fn manga_detail(&self, manga_id: i64) -> Result<MangaDetail>;

    /// Adds a manga to the library with auto-update enabled.
    async fn add_to_library(&self, manga_id: i64) -> Result<()>;

    /// Enumerates the chapters of one manga in server order.
    async fn chapters(&self, manga_id: i64) -> Result<Vec<ChapterRef>>;

    /// Submits one batch of chapter ids to the remote download queue.
    async fn enqueue_downloads(&self, chapter_ids: &[i64]) -> Result<()>;

    /// Reads the current download queue state.
    async fn download_status(&self) -> Result<QueueSnapshot>;

    /// Reads the aggregate library counters.
    async fn library_stats(&self) -> Result<LibraryStats>;

    /// Reads library update progress and the most recently fetched chapters.
    async fn update_check(&self, limit: usize) -> Result<UpdateCheck>;
}

/// Authenticated GraphQL client for one Suwayomi server.
///
/// Connections are pooled and reused across calls; every request carries the
/// configured bearer credential. Transient failures (timeout, connection
/// reset, 5xx) are retried with exponential backoff up to the configured
/// attempt count; 401/403 and undecodable payloads are never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl ApiClient {
    /// Builds a client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the credential cannot be used as a
    /// header value, or a transport error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_token);
        let mut auth_value = HeaderValue::from_str(&bearer)
            .map_err(|_| Error::validation("API token contains invalid header characters"))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("yomu/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(10)
            .gzip(true)
            .brotli(true)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Transport { attempts: 0, cause: e })?;

        Ok(Self {
            http,
            endpoint: config.graphql_endpoint(),
            max_retries: config.max_retries,
        })
    }

    /// Executes one GraphQL operation and returns its `data` payload.
    ///
    /// Retries transient failures with exponential backoff. A 200 response
    /// whose body carries GraphQL errors and no data is surfaced as
    /// [`Error::Api`] without a retry.
    pub async fn execute(&self, operation: &str, variables: Value) -> Result<Value> {
        let payload = json!({ "query": operation, "variables": variables });
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let sent = self.http.post(&self.endpoint).json(&payload).send().await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    if attempts <= self.max_retries {
                        let delay = backoff_delay(attempts);
                        tracing::warn!(
                            attempt = attempts,
                            error = %e,
                            "request failed, retrying in {}ms",
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(Error::Transport { attempts, cause: e });
                }
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(Error::auth(format!("server returned {status}")));
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts <= self.max_retries {
                    let delay = backoff_delay(attempts);
                    tracing::warn!(
                        attempt = attempts,
                        "rate limited by server, backing off {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                return Err(Error::rate_limited(retry_after));
            }

            if status.is_server_error() {
                // error_for_status gives us a reqwest::Error to carry as cause
                let Err(cause) = response.error_for_status() else {
                    return Err(Error::api(format!("unexpected HTTP status {status}")));
                };
                if attempts <= self.max_retries {
                    let delay = backoff_delay(attempts);
                    tracing::warn!(
                        attempt = attempts,
                        %status,
                        "server error, retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(Error::Transport { attempts, cause });
            }

            if !status.is_success() {
                return Err(Error::api(format!("unexpected HTTP status {status}")));
            }

            let body: GqlResponse = response
                .json()
                .await
                .map_err(|e| Error::decode(format!("invalid GraphQL response: {e}")))?;

            if let Some(errors) = &body.errors {
                let message = errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                // Partial data alongside errors is still usable
                if body.data.is_none() {
                    return Err(Error::api(message));
                }
                tracing::debug!(%message, "operation returned partial data with errors");
            }

            return body
                .data
                .ok_or_else(|| Error::decode("response has neither data nor errors"));
        }
    }

    /// Executes a list of operations with bounded concurrency.
    ///
    /// Results come back in input order; each operation succeeds or fails
    /// independently.
    pub async fn execute_many(&self, operations: Vec<(&str, Value)>) -> Vec<Result<Value>> {
        stream::iter(operations)
            .map(|(op, vars)| self.execute(op, vars))
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await
    }

    /// Asks the server for its name and version.
    ///
    /// Used at startup to verify the endpoint and credential before the
    /// pipeline starts issuing real work.
    pub async fn about_server(&self) -> Result<ServerAbout> {
        let data = self.execute(OP_ABOUT_SERVER, json!({})).await?;
        let about: WireAboutEnvelope = serde_json::from_value(data)?;
        Ok(about.about_server)
    }
}

#[async_trait]
impl ServerApi for ApiClient {
    async fn server_sources(&self) -> Result<Vec<SourceInfo>> {
        let data = self.execute(OP_LIST_SOURCES, json!({})).await?;
        let wire: WireSources = serde_json::from_value(data)?;
        Ok(wire
            .sources
            .nodes
            .into_iter()
            .map(|s| SourceInfo {
                id: s.id,
                name: s.display_name,
                lang: s.lang,
                nsfw: s.is_nsfw,
                enabled: true,
                supports_latest: s.supports_latest,
            })
            .collect())
    }

    async fn search_source(&self, source_id: &str, query: &str) -> Result<Vec<SearchHit>> {
        let vars = json!({ "sourceId": source_id, "query": query });
        let data = self.execute(OP_SEARCH_SOURCE, vars).await?;
        let wire: WireSearch = serde_json::from_value(data)?;
        Ok(hits_from_page(source_id, wire.fetch_source_manga))
    }

    async fn browse_source(&self, source_id: &str, kind: BrowseKind) -> Result<Vec<SearchHit>> {
        let operation = match kind {
            BrowseKind::Latest => OP_BROWSE_LATEST,
            BrowseKind::Popular => OP_BROWSE_POPULAR,
        };
        let data = self.execute(operation, json!({ "sourceId": source_id })).await?;
        let wire: WireSearch = serde_json::from_value(data)?;
        Ok(hits_from_page(source_id, wire.fetch_source_manga))
    }

    async fn manga_detail(&self, manga_id: i64) -> Result<MangaDetail> {
        let data = self.execute(OP_MANGA_DETAIL, json!({ "id": manga_id })).await?;
        let wire: WireMangaEnvelope = serde_json::from_value(data)?;
        let m = wire.manga;
        Ok(MangaDetail {
            id: m.id,
            title: m.title,
            author: m.author,
            artist: m.artist,
            description: m.description,
            genres: m.genre,
            status: m.status,
            thumbnail_url: m.thumbnail_url,
            in_library: m.in_library,
            chapter_count: m.chapters.total_count,
        })
    }

    async fn add_to_library(&self, manga_id: i64) -> Result<()> {
        let data = self.execute(OP_ADD_TO_LIBRARY, json!({ "id": manga_id })).await?;
        let wire: WireUpdateManga = serde_json::from_value(data)?;
        if !wire.update_manga.manga.in_library {
            return Err(Error::api(format!(
                "server did not flag manga {manga_id} as in-library"
            )));
        }
        Ok(())
    }

    async fn chapters(&self, manga_id: i64) -> Result<Vec<ChapterRef>> {
        let data = self
            .execute(OP_LIST_CHAPTERS, json!({ "mangaId": manga_id }))
            .await?;
        let wire: WireChapterList = serde_json::from_value(data)?;
        Ok(wire
            .manga
            .chapters
            .nodes
            .into_iter()
            .map(|c| ChapterRef {
                id: c.id,
                number: c.chapter_number,
                name: c.name,
            })
            .collect())
    }

    async fn enqueue_downloads(&self, chapter_ids: &[i64]) -> Result<()> {
        let vars = json!({ "chapterIds": chapter_ids });
        self.execute(OP_ENQUEUE_DOWNLOADS, vars).await.map(|_| ())
    }

    async fn download_status(&self) -> Result<QueueSnapshot> {
        let data = self.execute(OP_DOWNLOAD_STATUS, json!({})).await?;
        let wire: WireDownloadStatusEnvelope = serde_json::from_value(data)?;
        let status = wire.download_status;
        Ok(QueueSnapshot {
            running: status.state.eq_ignore_ascii_case("started")
                || status.state.eq_ignore_ascii_case("running"),
            items: status
                .queue
                .into_iter()
                .map(|item| QueueItem {
                    manga_title: item.chapter.manga.title,
                    chapter_title: item.chapter.name,
                    percent: item.progress.clamp(0.0, 100.0).round() as u8,
                })
                .collect(),
        })
    }

    async fn library_stats(&self) -> Result<LibraryStats> {
        let data = self.execute(OP_LIBRARY_STATS, json!({})).await?;
        let wire: WireLibraryStats = serde_json::from_value(data)?;
        Ok(LibraryStats {
            total_manga: wire.mangas.total_count,
            library_manga: wire.library_mangas.total_count,
            total_chapters: wire.chapters.total_count,
            unread_chapters: wire.unread_chapters.total_count,
            downloaded_chapters: wire.downloaded_chapters.total_count,
        })
    }

    async fn update_check(&self, limit: usize) -> Result<UpdateCheck> {
        let data = self.execute(OP_UPDATE_CHECK, json!({ "limit": limit })).await?;
        let wire: WireUpdateEnvelope = serde_json::from_value(data)?;
        let status = wire.update_status;
        Ok(UpdateCheck {
            running: status.is_running,
            running_jobs: status.running_jobs.mangas.len() as u64,
            pending_jobs: status.pending_jobs.mangas.len() as u64,
            complete_jobs: status.complete_jobs.mangas.len() as u64,
            failed_jobs: status.failed_jobs.mangas.len() as u64,
            recent_chapters: wire
                .chapters
                .nodes
                .into_iter()
                .map(|c| RecentChapter {
                    manga_title: c.manga.title,
                    name: c.name,
                    number: c.chapter_number,
                    is_read: c.is_read,
                })
                .collect(),
        })
    }
}

fn hits_from_page(source_id: &str, page: WireSearchPage) -> Vec<SearchHit> {
    page.mangas
        .into_iter()
        .map(|m| SearchHit {
            source_id: source_id.to_string(),
            manga_id: m.id,
            title: m.title,
            cover_url: m.thumbnail_url,
            author: m.author,
            status: m.status,
            in_library: m.in_library,
        })
        .collect()
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt.min(6)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(6), backoff_delay(9));
    }

    #[test]
    fn decode_search_page() {
        let data = serde_json::json!({
            "fetchSourceManga": {
                "mangas": [
                    { "id": 7, "title": "One Piece", "thumbnailUrl": null,
                      "author": "Oda", "status": "ONGOING", "inLibrary": false }
                ]
            }
        });
        let wire: WireSearch = serde_json::from_value(data).unwrap();
        assert_eq!(wire.fetch_source_manga.mangas[0].id, 7);
    }

    #[test]
    fn decode_download_status_percent() {
        let data = serde_json::json!({
            "downloadStatus": {
                "state": "STARTED",
                "queue": [
                    { "progress": 42.6, "chapter": { "name": "Ch. 1", "manga": { "title": "T" } } }
                ]
            }
        });
        let wire: WireDownloadStatusEnvelope = serde_json::from_value(data).unwrap();
        assert_eq!(wire.download_status.queue[0].progress, 42.6);
    }

    #[test]
    fn decode_update_envelope() {
        let data = serde_json::json!({
            "updateStatus": {
                "isRunning": true,
                "runningJobs": { "mangas": [{"id": 1}, {"id": 2}] },
                "pendingJobs": { "mangas": [] },
                "completeJobs": { "mangas": [{"id": 3}] },
                "failedJobs": { "mangas": [] }
            },
            "chapters": {
                "nodes": [
                    { "name": "Ch. 5", "chapterNumber": 5.0, "isRead": false,
                      "manga": { "title": "T" } }
                ]
            }
        });
        let wire: WireUpdateEnvelope = serde_json::from_value(data).unwrap();
        assert!(wire.update_status.is_running);
        assert_eq!(wire.update_status.running_jobs.mangas.len(), 2);
        assert_eq!(wire.chapters.nodes[0].chapter_number, 5.0);
    }

    #[test]
    fn graphql_errors_without_data_decode() {
        let body = r#"{"data": null, "errors": [{"message": "boom"}]}"#;
        let parsed: GqlResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "boom");
    }
}
