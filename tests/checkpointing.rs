//! Checkpointing and restart-recovery behavior.
//!
//! These tests share a checkpointer between two runner instances to
//! simulate a process restart: the first runner suspends and goes away,
//! the second resumes the session from its latest checkpoint.

mod common;

use std::sync::Arc;

use burnish::graph::improvement_graph;
use burnish::interact::{HumanAnswer, SuspendRequest};
use burnish::runtimes::{
    Checkpointer, InMemoryCheckpointer, RunOutcome, Runner, RunnerError, RunStatus,
};
use burnish::state::Phase;
use burnish::types::NodeId;

use common::{MockGenerator, sample_gaps, sample_resume};

fn runner_with(checkpointer: Arc<dyn Checkpointer>) -> Runner {
    let graph = improvement_graph(MockGenerator::new()).expect("graph compiles");
    Runner::with_checkpointer(Arc::new(graph), checkpointer, true)
}

#[tokio::test]
async fn suspended_session_survives_a_restart() {
    let store: Arc<InMemoryCheckpointer> = Arc::new(InMemoryCheckpointer::new());

    // First process: start and park on the gap confirm.
    let first_prompt = {
        let mut runner = runner_with(store.clone());
        let outcome = runner
            .start("restart", sample_resume(), sample_gaps())
            .await
            .unwrap();
        let RunOutcome::Suspended(request) = outcome else {
            panic!("expected suspension");
        };
        request.prompt().to_string()
    };

    // The checkpoint captures the park position and the outstanding
    // request, so a cold process can re-present the same prompt.
    let checkpoint = store.load_latest("restart").await.unwrap().unwrap();
    assert_eq!(checkpoint.cursor, NodeId::AskGapConfirm);
    assert_eq!(checkpoint.status, RunStatus::Suspended);
    assert_eq!(
        checkpoint.pending_request.as_ref().map(|r| r.prompt().to_string()),
        Some(first_prompt)
    );

    // Second process: resume with no in-memory state at all.
    let mut runner = runner_with(store.clone());
    let outcome = runner
        .resume("restart", HumanAnswer::confirmed(false))
        .await
        .unwrap();
    let RunOutcome::Suspended(request) = outcome else {
        panic!("expected the second gap's confirm");
    };
    assert!(request.prompt().contains("Public speaking"));

    let state = &runner.session("restart").unwrap().state;
    assert_eq!(state.gap_responses.len(), 1);
    assert!(!state.gap_responses[0].has_experience);
}

#[tokio::test]
async fn sequential_cold_resumes_append_each_response_once() {
    let store: Arc<InMemoryCheckpointer> = Arc::new(InMemoryCheckpointer::new());

    {
        let mut runner = runner_with(store.clone());
        let outcome = runner
            .start("replay", sample_resume(), sample_gaps())
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Suspended(_)));
    }

    // Each answer lands in a fresh runner hydrated from the latest
    // checkpoint, the way repeated restarts deliver them. Every resume
    // must append exactly one gap response.
    for _ in 0..2 {
        let mut runner = runner_with(store.clone());
        let outcome = runner
            .resume("replay", HumanAnswer::confirmed(false))
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Suspended(_)));
    }

    let checkpoint = store.load_latest("replay").await.unwrap().unwrap();
    let skills: Vec<&str> = checkpoint
        .state
        .gap_responses
        .iter()
        .map(|gr| gr.gap.skill.as_str())
        .collect();
    assert_eq!(skills, ["Kubernetes", "Public speaking"]);
    assert_eq!(checkpoint.state.phase, Phase::JobDeepDive);
}

#[tokio::test]
async fn resume_of_unknown_session_fails() {
    let mut runner = runner_with(Arc::new(InMemoryCheckpointer::new()));
    let err = runner
        .resume("nobody", HumanAnswer::text("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::SessionNotFound { .. }));
}

#[tokio::test]
async fn starting_a_duplicate_session_fails() {
    let store: Arc<InMemoryCheckpointer> = Arc::new(InMemoryCheckpointer::new());
    let mut runner = runner_with(store.clone());
    runner
        .start("dup", sample_resume(), sample_gaps())
        .await
        .unwrap();

    // In the same process.
    let err = runner
        .start("dup", sample_resume(), sample_gaps())
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::SessionExists { .. }));

    // And from a fresh process sharing the store.
    let mut other = runner_with(store);
    let err = other
        .start("dup", sample_resume(), sample_gaps())
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::SessionExists { .. }));
}

#[tokio::test]
async fn completed_session_rejects_further_answers() {
    let mut runner = runner_with(Arc::new(InMemoryCheckpointer::new()));

    let resume = {
        let mut data = sample_resume();
        data.experience.clear();
        data
    };
    // No gaps and no jobs: the session completes without suspending.
    let outcome = runner.start("done", resume, Vec::new()).await.unwrap();
    let RunOutcome::Completed(state) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(state.phase, Phase::Completed);
    assert!(state.job_results.is_empty());

    let err = runner
        .resume("done", HumanAnswer::text("anything"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RunnerError::NotSuspended {
            status: RunStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn pending_request_is_visible_while_suspended() {
    let mut runner = runner_with(Arc::new(InMemoryCheckpointer::new()));
    let outcome = runner
        .start("pending", sample_resume(), sample_gaps())
        .await
        .unwrap();
    let RunOutcome::Suspended(request) = outcome else {
        panic!("expected suspension");
    };

    let pending = runner.pending_request("pending").expect("request pending");
    assert_eq!(pending, &request);
    assert!(matches!(pending, SuspendRequest::Confirm { .. }));

    runner
        .resume("pending", HumanAnswer::confirmed(false))
        .await
        .unwrap();
    // A new suspension replaces the old request.
    let next = runner.pending_request("pending").expect("request pending");
    assert!(next.prompt().contains("Public speaking"));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use burnish::runtimes::SqliteCheckpointer;

    async fn connect_in(dir: &tempfile::TempDir) -> SqliteCheckpointer {
        let url = format!(
            "sqlite://{}",
            dir.path().join("checkpoints.db").to_string_lossy()
        );
        SqliteCheckpointer::connect(&url).await.expect("connect")
    }

    #[tokio::test]
    async fn sqlite_checkpoints_survive_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let session_id = format!("sq_{}", uuid::Uuid::new_v4());

        {
            let store = Arc::new(connect_in(&dir).await);
            let mut runner = runner_with(store);
            let outcome = runner
                .start(&session_id, sample_resume(), sample_gaps())
                .await
                .unwrap();
            assert!(matches!(outcome, RunOutcome::Suspended(_)));
        }

        // Reconnect to the same file, as a restarted process would.
        let store = Arc::new(connect_in(&dir).await);
        let checkpoint = store.load_latest(&session_id).await.unwrap().unwrap();
        assert_eq!(checkpoint.cursor, NodeId::AskGapConfirm);
        assert_eq!(checkpoint.status, RunStatus::Suspended);
        assert!(checkpoint.pending_request.is_some());

        let mut runner = runner_with(store);
        let outcome = runner
            .resume(&session_id, HumanAnswer::confirmed(false))
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Suspended(_)));
    }

    #[tokio::test]
    async fn sqlite_keeps_step_history_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let session_id = format!("hist_{}", uuid::Uuid::new_v4());

        let store = Arc::new(connect_in(&dir).await);
        let mut runner = runner_with(store.clone());
        runner
            .start(&session_id, sample_resume(), sample_gaps())
            .await
            .unwrap();
        runner
            .resume(&session_id, HumanAnswer::confirmed(false))
            .await
            .unwrap();

        let history = store.load_history(&session_id).await.unwrap();
        assert!(history.len() >= 2);
        let steps: Vec<u64> = history.iter().map(|cp| cp.step).collect();
        let mut sorted = steps.clone();
        sorted.sort_unstable();
        assert_eq!(steps, sorted);
        // The latest history entry matches the denormalized session row.
        let latest = store.load_latest(&session_id).await.unwrap().unwrap();
        assert_eq!(history.last().map(|cp| cp.step), Some(latest.step));
    }

    #[tokio::test]
    async fn sqlite_lists_known_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(connect_in(&dir).await);

        let a = format!("list_a_{}", uuid::Uuid::new_v4());
        let b = format!("list_b_{}", uuid::Uuid::new_v4());
        for id in [&a, &b] {
            let mut runner = runner_with(store.clone());
            runner
                .start(id, sample_resume(), sample_gaps())
                .await
                .unwrap();
        }

        let sessions = store.list_sessions().await.unwrap();
        assert!(sessions.contains(&a));
        assert!(sessions.contains(&b));
        assert!(store.load_latest("missing").await.unwrap().is_none());
    }
}
