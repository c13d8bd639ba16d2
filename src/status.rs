//! Periodic library status publication.
//!
//! The poller queries aggregate library counters on a fixed interval and
//! publishes a short human-readable line through a watch channel. The poller
//! is the only writer; presentation collaborators hold the receiving end and
//! read the latest value whenever they refresh. A failed tick is logged and
//! skipped, leaving the previously published line in place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::ServerApi;
use crate::config::Config;

/// Publishes a library status line on a fixed interval.
pub struct StatusPoller {
    api: Arc<dyn ServerApi>,
    interval: Duration,
    query_timeout: Duration,
}

impl StatusPoller {
    /// Creates a poller using the configured interval and per-query timeout.
    pub fn new(api: Arc<dyn ServerApi>, config: &Config) -> Self {
        Self {
            api,
            interval: config.poll_interval,
            query_timeout: config.poll_timeout,
        }
    }

    /// Spawns the polling loop.
    ///
    /// The first tick fires immediately, then once per interval. Each tick's
    /// query is bounded by the configured timeout so a stalled request can
    /// never hold a tick past the next one. Dropping every receiver stops the
    /// loop; aborting the handle does too.
    pub fn spawn(self) -> (watch::Receiver<String>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(String::new());

        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(self.interval);
            loop {
                ticks.tick().await;
                match tokio::time::timeout(self.query_timeout, self.api.library_stats()).await {
                    Ok(Ok(stats)) => {
                        let line = stats.presence_line();
                        tracing::debug!(%line, "publishing library status");
                        if tx.send(line).is_err() {
                            return;
                        }
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(%error, "library stats query failed, keeping previous status");
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout = ?self.query_timeout,
                            "library stats query timed out, keeping previous status"
                        );
                    }
                }
            }
        });

        (rx, handle)
    }
}
