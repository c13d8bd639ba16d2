//! Interactive selection sessions.
//!
//! A [`SelectionSession`] is a short-lived state machine created for one
//! search invocation. It presents the aggregated candidates, waits for a
//! single choice from the invoking user within a fixed deadline, and on a
//! valid choice resolves it: fetches the manga detail, adds it to the
//! library, enumerates its chapters and hands them to the download
//! orchestrator.
//!
//! The session owns no shared state. Events reach it through a dedicated
//! channel, the deadline is a fixed instant that is never extended, and every
//! terminal state is final.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::client::ServerApi;
use crate::config::Config;
use crate::download::{DownloadOrchestrator, SubmissionReport};
use crate::error::Error;
use crate::search::{SearchHitExt, SearchOutcome};
use crate::types::{MangaDetail, SearchHit};

/// Maximum number of candidates offered for selection.
///
/// The merged result set is deduplicated by title and truncated to this many
/// entries before presentation; selection indexes are positions in that
/// truncated list.
pub const MAX_PRESENTED: usize = 25;

/// Identity of the invocation a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// User who started the search; the only user whose events are accepted.
    pub user_id: u64,
    /// Channel or surface the results were presented in.
    pub channel_id: u64,
    /// The query the candidates were produced for.
    pub query: String,
}

/// An event delivered to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The given user picked the candidate at `index`.
    Choice { user_id: u64, index: usize },
    /// The given user asked to abort the session.
    Cancel { user_id: u64 },
}

/// Session lifecycle. `Completed`, `TimedOut`, `Cancelled` and `Failed` are
/// terminal; a session never re-enters `AwaitingChoice` once it has left.
#[derive(Debug)]
pub enum SessionState {
    Presenting,
    AwaitingChoice,
    Resolving,
    Completed(Resolution),
    TimedOut,
    Cancelled,
    Failed {
        error: Error,
        /// Whatever resolution progress was made before the failure.
        progress: Resolution,
    },
}

impl SessionState {
    /// Returns `true` for states the session cannot leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed(_)
                | SessionState::TimedOut
                | SessionState::Cancelled
                | SessionState::Failed { .. }
        )
    }
}

/// Progress record for the resolving phase.
///
/// Filled in step by step so a failure partway through still reports what did
/// happen, e.g. the library add succeeding before chapter enumeration failed.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Detail of the chosen manga, once fetched.
    pub detail: Option<MangaDetail>,
    /// Whether the library add went through.
    pub added_to_library: bool,
    /// Number of chapters enumerated for download.
    pub chapter_count: usize,
    /// Batch submission report, once the orchestrator ran.
    pub report: Option<SubmissionReport>,
}

/// Presentation collaborator for a session.
///
/// The session drives the state machine; rendering candidates, showing the
/// chosen manga and disabling the selection affordance when the session ends
/// are all delegated here. Implementations live in the hosting process.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Shows the candidate list and a selection affordance. `summary` carries
    /// the per-source failure line when some sources failed.
    async fn show_candidates(
        &self,
        invocation: &Invocation,
        candidates: &[SearchHit],
        summary: Option<&str>,
    );

    /// Shows detail for the chosen manga once resolution begins.
    async fn show_detail(&self, invocation: &Invocation, detail: &MangaDetail);

    /// Called exactly once with the terminal state; implementations disable
    /// any still-rendered selection affordance here.
    async fn close(&self, invocation: &Invocation, state: &SessionState);
}

/// One live selection session.
pub struct SelectionSession {
    invocation: Invocation,
    candidates: Vec<SearchHit>,
    summary: Option<String>,
    deadline: std::time::Duration,
}

impl SelectionSession {
    /// Builds a session from an aggregate search outcome.
    ///
    /// Merges the outcome, deduplicates by title and truncates to
    /// [`MAX_PRESENTED`] candidates.
    pub fn new(invocation: Invocation, outcome: &SearchOutcome, config: &Config) -> Self {
        let mut candidates = outcome.merged().dedupe_by_title();
        candidates.truncate(MAX_PRESENTED);
        let summary = (!outcome.failures.is_empty()).then(|| outcome.summary());
        Self {
            invocation,
            candidates,
            summary,
            deadline: config.selection_deadline,
        }
    }

    /// Candidates in presentation order.
    pub fn candidates(&self) -> &[SearchHit] {
        &self.candidates
    }

    /// Runs the session to a terminal state.
    ///
    /// Presents the candidates, then waits for an event from the originating
    /// user or the deadline, whichever comes first. Events from other users
    /// are ignored without extending the deadline. A closed event channel is
    /// treated as cancellation. The terminal state is passed to
    /// [`Presenter::close`] and returned.
    pub async fn run(
        self,
        api: Arc<dyn ServerApi>,
        orchestrator: &DownloadOrchestrator,
        presenter: &dyn Presenter,
        mut events: mpsc::Receiver<SessionEvent>,
    ) -> SessionState {
        // The deadline is fixed at session start and never reset.
        let deadline = Instant::now() + self.deadline;

        let mut state = SessionState::Presenting;
        tracing::debug!(user = self.invocation.user_id, ?state, "session started");
        presenter
            .show_candidates(&self.invocation, &self.candidates, self.summary.as_deref())
            .await;

        state = SessionState::AwaitingChoice;
        tracing::debug!(?state, candidates = self.candidates.len(), "presented");

        let chosen = loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::info!(user = self.invocation.user_id, "selection deadline elapsed");
                    let state = SessionState::TimedOut;
                    presenter.close(&self.invocation, &state).await;
                    return state;
                }
                event = events.recv() => match event {
                    None => {
                        let state = SessionState::Cancelled;
                        presenter.close(&self.invocation, &state).await;
                        return state;
                    }
                    Some(SessionEvent::Cancel { user_id })
                        if user_id == self.invocation.user_id =>
                    {
                        let state = SessionState::Cancelled;
                        presenter.close(&self.invocation, &state).await;
                        return state;
                    }
                    Some(SessionEvent::Choice { user_id, index })
                        if user_id == self.invocation.user_id =>
                    {
                        if index < self.candidates.len() {
                            break index;
                        }
                        tracing::debug!(index, "ignoring out-of-range choice");
                    }
                    Some(event) => {
                        tracing::debug!(?event, "ignoring event from non-originating user");
                    }
                }
            }
        };

        state = SessionState::Resolving;
        tracing::debug!(?state, choice = chosen, "selection accepted");

        let state = self.resolve(chosen, api, orchestrator, presenter).await;
        presenter.close(&self.invocation, &state).await;
        state
    }

    /// Resolving phase: detail fetch, library add, chapter enumeration and
    /// download submission, in that order. The first failure ends the session
    /// with the progress made so far attached.
    async fn resolve(
        &self,
        chosen: usize,
        api: Arc<dyn ServerApi>,
        orchestrator: &DownloadOrchestrator,
        presenter: &dyn Presenter,
    ) -> SessionState {
        let hit = &self.candidates[chosen];
        let mut progress = Resolution::default();

        tracing::info!(
            user = self.invocation.user_id,
            manga = hit.manga_id,
            title = %hit.title,
            "resolving selection"
        );

        let detail = match api.manga_detail(hit.manga_id).await {
            Ok(detail) => detail,
            Err(error) => return SessionState::Failed { error, progress },
        };
        presenter.show_detail(&self.invocation, &detail).await;
        progress.detail = Some(detail);

        if let Err(error) = api.add_to_library(hit.manga_id).await {
            return SessionState::Failed { error, progress };
        }
        progress.added_to_library = true;

        let chapters = match api.chapters(hit.manga_id).await {
            Ok(chapters) => chapters,
            Err(error) => return SessionState::Failed { error, progress },
        };
        progress.chapter_count = chapters.len();

        let ids: Vec<i64> = chapters.iter().map(|c| c.id).collect();
        progress.report = Some(orchestrator.submit_all(&ids).await);
        SessionState::Completed(progress)
    }
}
