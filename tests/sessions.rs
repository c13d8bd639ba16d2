//! Selection session tests
//!
//! Deadline handling, event filtering by originating user, cancellation and
//! the resolving pipeline with partial-progress reporting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use yomu::prelude::*;
use yomu::search::{SourceFailure, SourceResults};
use yomu::session::Resolution;
use yomu::types::MangaDetail;

mod common;
use common::{MockApi, chapter, hit, source, test_config};

/// Presenter double that records the calls it receives, in order.
#[derive(Default)]
struct RecordingPresenter {
    events: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn show_candidates(
        &self,
        _invocation: &Invocation,
        candidates: &[SearchHit],
        summary: Option<&str>,
    ) {
        self.push(format!(
            "candidates:{}:{}",
            candidates.len(),
            summary.unwrap_or("ok")
        ));
    }

    async fn show_detail(&self, _invocation: &Invocation, detail: &MangaDetail) {
        self.push(format!("detail:{}", detail.id));
    }

    async fn close(&self, _invocation: &Invocation, state: &SessionState) {
        let label = match state {
            SessionState::Completed(_) => "completed",
            SessionState::TimedOut => "timed_out",
            SessionState::Cancelled => "cancelled",
            SessionState::Failed { .. } => "failed",
            _ => "other",
        };
        self.push(format!("close:{label}"));
    }
}

fn invocation() -> Invocation {
    Invocation {
        user_id: 7,
        channel_id: 100,
        query: "one piece".to_string(),
    }
}

fn outcome_with_hits(hits: Vec<SearchHit>) -> SearchOutcome {
    SearchOutcome {
        groups: vec![SourceResults {
            source: source("a", false),
            hits,
        }],
        failures: Vec::new(),
        dispatched: 1,
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_on_valid_choice() {
        let mut api = MockApi::default();
        api.chapters = (1..=5).map(|i| chapter(i, i as f64)).collect();
        let api = Arc::new(api);
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 42, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Choice { user_id: 7, index: 0 })
            .await
            .unwrap();

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        let SessionState::Completed(resolution) = state else {
            panic!("expected Completed, got {state:?}");
        };
        assert!(resolution.added_to_library);
        assert_eq!(resolution.chapter_count, 5);
        assert_eq!(resolution.report.unwrap().submitted(), 5);

        let ops: Vec<_> = api.calls().into_iter().map(|c| c.op).collect();
        assert_eq!(ops, ["detail:42", "add:42", "chapters:42", "enqueue:5:1,2,3,4,5"]);
        assert_eq!(
            presenter.events(),
            ["candidates:1:ok", "detail:42", "close:completed"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_a_choice() {
        let api = Arc::new(MockApi::default());
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 1, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (_tx, rx) = mpsc::channel::<SessionEvent>(8);
        let start = tokio::time::Instant::now();
        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        assert!(matches!(state, SessionState::TimedOut));
        assert_eq!(start.elapsed(), config.selection_deadline);
        // No resolving calls were made after the deadline.
        assert!(api.calls().is_empty());
        assert_eq!(presenter.events(), ["candidates:1:ok", "close:timed_out"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_events_from_other_users_without_extending_the_deadline() {
        let api = Arc::new(MockApi::default());
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 1, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        let start = tokio::time::Instant::now();
        let driver = tokio::spawn(async move {
            // A different user keeps clicking; none of it counts.
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx
                .send(SessionEvent::Choice { user_id: 999, index: 0 })
                .await;
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(SessionEvent::Cancel { user_id: 999 }).await;
            // Keep the sender alive past the deadline.
            tokio::time::sleep(Duration::from_secs(120)).await;
        });

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        assert!(matches!(state, SessionState::TimedOut));
        assert_eq!(start.elapsed(), config.selection_deadline);
        assert!(api.calls().is_empty());
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_from_the_originating_user_ends_the_session() {
        let api = Arc::new(MockApi::default());
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 1, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Cancel { user_id: 7 }).await.unwrap();

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        assert!(matches!(state, SessionState::Cancelled));
        assert!(api.calls().is_empty());
        assert_eq!(presenter.events(), ["candidates:1:ok", "close:cancelled"]);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_choice_is_ignored() {
        let mut api = MockApi::default();
        api.chapters = vec![chapter(1, 1.0)];
        let api = Arc::new(api);
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 1, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Choice { user_id: 7, index: 9 })
            .await
            .unwrap();
        tx.send(SessionEvent::Choice { user_id: 7, index: 0 })
            .await
            .unwrap();

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        assert!(matches!(state, SessionState::Completed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_during_resolving_keeps_partial_progress() {
        let mut api = MockApi::default();
        api.fail_chapters = true;
        let api = Arc::new(api);
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 42, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Choice { user_id: 7, index: 0 })
            .await
            .unwrap();

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        let SessionState::Failed { error: _, progress } = state else {
            panic!("expected Failed");
        };
        // Detail fetch and library add happened before the failure and are
        // reported rather than swallowed.
        assert!(progress.detail.is_some());
        assert!(progress.added_to_library);
        assert_eq!(progress.chapter_count, 0);
        assert!(progress.report.is_none());
        assert_eq!(presenter.events().last().unwrap(), "close:failed");
    }

    #[tokio::test(start_paused = true)]
    async fn candidates_are_deduplicated_and_capped() {
        let config = test_config();
        let mut hits: Vec<SearchHit> = (0..40).map(|i| hit("a", i, &format!("Title {i}"))).collect();
        hits.push(hit("a", 99, "title 0"));

        let outcome = outcome_with_hits(hits);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let candidates = session.candidates();
        assert_eq!(candidates.len(), yomu::session::MAX_PRESENTED);
        // Case-insensitive duplicate of "Title 0" was dropped.
        assert!(candidates.iter().all(|c| c.manga_id != 99));
    }

    #[tokio::test(start_paused = true)]
    async fn completes_with_an_empty_report_when_no_chapters_exist() {
        let api = Arc::new(MockApi::default());
        let config = test_config();
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = outcome_with_hits(vec![hit("a", 42, "One Piece")]);
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Choice { user_id: 7, index: 0 })
            .await
            .unwrap();

        let state = session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        let SessionState::Completed(Resolution { report, .. }) = state else {
            panic!("expected Completed");
        };
        let report = report.unwrap();
        assert!(report.batches.is_empty());
        assert!(report.is_complete());
        assert!(api.calls_with_prefix("enqueue:").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_summary_is_surfaced_with_the_candidates() {
        let config = test_config();
        let api = Arc::new(MockApi::default());
        let orchestrator = DownloadOrchestrator::new(Arc::clone(&api) as Arc<dyn ServerApi>, &config);
        let presenter = RecordingPresenter::default();

        let outcome = SearchOutcome {
            groups: vec![SourceResults {
                source: source("a", false),
                hits: vec![hit("a", 1, "One Piece")],
            }],
            failures: vec![SourceFailure {
                source_id: "b".to_string(),
                source_name: "B".to_string(),
                error: yomu::Error::api("unavailable"),
            }],
            dispatched: 2,
        };
        let session = SelectionSession::new(invocation(), &outcome, &config);

        let (tx, rx) = mpsc::channel(8);
        tx.send(SessionEvent::Cancel { user_id: 7 }).await.unwrap();
        session
            .run(Arc::clone(&api) as Arc<dyn ServerApi>, &orchestrator, &presenter, rx)
            .await;

        assert_eq!(
            presenter.events()[0],
            "candidates:1:1 of 2 sources failed"
        );
    }
}
