//! Download orchestration: batched submission and queue snapshots.
//!
//! Chapter ids are submitted to the server in fixed-size batches, strictly
//! sequentially, with a short pause between batches so a large request does
//! not hammer the server. Submission is best-effort per batch: a failed batch
//! is recorded and the remaining batches are still attempted.

use std::sync::Arc;
use std::time::Duration;

use crate::client::ServerApi;
use crate::config::Config;
use crate::error::Result;
use crate::types::QueueSnapshot;

/// Splits chapter submissions into batches and reads queue state.
pub struct DownloadOrchestrator {
    api: Arc<dyn ServerApi>,
    batch_size: usize,
    batch_delay: Duration,
}

/// Outcome of one [`DownloadOrchestrator::submit_all`] call.
///
/// Holds one [`BatchResult`] per batch, in submission order; a submission of
/// L ids always yields `ceil(L / batch_size)` entries, zero included.
#[derive(Debug)]
pub struct SubmissionReport {
    pub batches: Vec<BatchResult>,
}

/// One batch's submission result.
#[derive(Debug)]
pub struct BatchResult {
    /// Zero-based position in submission order.
    pub index: usize,
    /// Number of chapter ids in this batch.
    pub size: usize,
    pub result: Result<()>,
}

impl SubmissionReport {
    /// Total chapter ids accepted by the server.
    pub fn submitted(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.result.is_ok())
            .map(|b| b.size)
            .sum()
    }

    /// Total chapter ids in batches the server rejected.
    pub fn failed(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.result.is_err())
            .map(|b| b.size)
            .sum()
    }

    /// Returns `true` when every batch was accepted.
    pub fn is_complete(&self) -> bool {
        self.batches.iter().all(|b| b.result.is_ok())
    }
}

impl DownloadOrchestrator {
    /// Creates an orchestrator using the configured batch size and delay.
    pub fn new(api: Arc<dyn ServerApi>, config: &Config) -> Self {
        Self {
            api,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
        }
    }

    /// Submits chapter ids for download, batched and paced.
    ///
    /// Batches preserve the input order; each batch holds at most the
    /// configured batch size, with only the final batch smaller. Batches are
    /// sent one at a time with the configured delay between them, never
    /// concurrently. An empty id list yields an empty report without touching
    /// the server. Submission never fails as a whole; per-batch outcomes live
    /// in the [`SubmissionReport`].
    pub async fn submit_all(&self, chapter_ids: &[i64]) -> SubmissionReport {
        let total_batches = chapter_ids.len().div_ceil(self.batch_size);
        tracing::info!(
            chapters = chapter_ids.len(),
            batches = total_batches,
            "submitting download batches"
        );

        let mut batches = Vec::with_capacity(total_batches);
        for (index, batch) in chapter_ids.chunks(self.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            let result = self.api.enqueue_downloads(batch).await;
            if let Err(error) = &result {
                tracing::warn!(batch = index, size = batch.len(), %error, "batch submission failed");
            }
            batches.push(BatchResult {
                index,
                size: batch.len(),
                result,
            });
        }

        SubmissionReport { batches }
    }

    /// Takes one consistent snapshot of the server's download queue.
    ///
    /// Each call is a fresh read; callers wanting the latest state call again
    /// rather than merging old snapshots.
    pub async fn snapshot(&self) -> Result<QueueSnapshot> {
        self.api.download_status().await
    }
}
