//! # Yomu - Async search and download pipeline for Suwayomi servers
//!
//! Yomu is an async client library that drives a Suwayomi-compatible manga
//! server: it fans a query out across every installed source, presents the
//! merged candidates through an interactive selection session, and on
//! confirmation adds the chosen manga to the library and submits its chapters
//! for download in paced batches. A background poller keeps a short library
//! status line published for presence display.
//!
//! ## Features
//!
//! - **Aggregate Search**: One query fanned out to every enabled source, with
//!   throttled launches, concurrent execution and per-source failure isolation
//! - **Selection Sessions**: A per-invocation state machine with a fixed
//!   deadline that only accepts events from the invoking user
//! - **Batched Downloads**: Chapter submissions split into fixed-size batches,
//!   sent sequentially with a pause between them, best-effort per batch
//! - **Status Polling**: Hourly library counters published through a watch
//!   channel, with failed ticks skipped rather than propagated
//! - **Source Browsing**: Latest and popular listings per source, plus a
//!   library update check, over the same client surface
//! - **Async/Await Support**: Built on tokio for concurrent operations over a
//!   single shared connection pool
//! - **Robust Error Handling**: A small error taxonomy separating auth,
//!   transport, decode, server and validation failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yomu::prelude::*;
//! use yomu::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let api: Arc<dyn ServerApi> = Arc::new(ApiClient::new(&config)?);
//!
//!     let registry = SourceRegistry::load(api.as_ref()).await?;
//!     let aggregator = SearchAggregator::new(Arc::clone(&api), &config);
//!
//!     let outcome = aggregator.search(&registry, &"one piece".into()).await?;
//!     for group in &outcome.groups {
//!         println!("{}: {} hits", group.source.name, group.hits.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`client`]: The API client and the [`ServerApi`] trait every pipeline
//!   component talks through
//! - [`registry`]: The ordered, immutable set of backend sources
//! - [`search`]: Multi-source search aggregation and result processing
//! - [`session`]: The interactive selection state machine
//! - [`download`]: Batched download submission and queue snapshots
//! - [`status`]: The periodic library status publisher
//! - [`config`]: Runtime configuration and environment loading
//! - [`types`]: Core data structures for sources, hits and queue state
//! - [`error`]: Comprehensive error handling
//!
//! ## Result Processing
//!
//! Merged search results can be post-processed before presentation:
//!
//! ```rust
//! # use yomu::prelude::*;
//! # fn example(outcome: &SearchOutcome) {
//! let candidates = outcome.merged().dedupe_by_title();
//! # }
//! ```

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod registry;
pub mod search;
pub mod session;
pub mod status;
pub mod types;

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types and traits, allowing a single
/// `use yomu::prelude::*;` statement.
pub mod prelude {
    pub use crate::{
        client::{ApiClient, ServerApi},
        config::Config,
        download::{DownloadOrchestrator, SubmissionReport},
        registry::SourceRegistry,
        search::{SearchAggregator, SearchHitExt, SearchOutcome},
        session::{Invocation, Presenter, SelectionSession, SessionEvent, SessionState},
        status::StatusPoller,
        types::{
            BrowseKind, LibraryStats, MangaDetail, QueueSnapshot, SearchHit, SearchRequest,
            SourceInfo, UpdateCheck,
        },
    };
}

// Re-export main types at crate root for direct access
pub use client::{ApiClient, ServerApi};
pub use config::Config;
pub use error::{Error, Result};
pub use registry::SourceRegistry;
pub use search::{SearchAggregator, SearchOutcome};
pub use session::{SelectionSession, SessionState};
pub use types::{SearchHit, SearchRequest};
