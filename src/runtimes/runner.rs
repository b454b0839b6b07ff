//! Session runner: drives the compiled graph, suspends on interaction
//! nodes, and persists checkpoints so sessions survive restarts.
//!
//! The runner owns a map of in-memory sessions plus a pluggable
//! [`Checkpointer`]. [`Runner::start`] creates a fresh session and runs
//! until the first suspension or completion; [`Runner::resume`] injects
//! the human's answer, routes onward from the suspended node without
//! re-executing it, and keeps running. A resume after restart restores
//! the session from its latest checkpoint transparently.

use std::sync::Arc;

use chrono::Utc;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::instrument;

use crate::graph::{GraphError, WorkflowGraph};
use crate::interact::{HumanAnswer, SuspendRequest};
use crate::models::{ExperienceData, SkillGap};
use crate::node::{NodeContext, NodeError, NodeOutcome};
use crate::runtimes::checkpointer::{
    Checkpoint, Checkpointer, CheckpointerError, InMemoryCheckpointer, RunStatus,
};
use crate::state::{StatePatch, WorkflowState};
use crate::types::NodeId;

/// In-memory execution state for one session.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub state: WorkflowState,
    pub cursor: NodeId,
    pub status: RunStatus,
    pub step: u64,
    pub pending_request: Option<SuspendRequest>,
}

/// What a drive of the graph ended with.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    /// Execution parked on an interaction node; answer via
    /// [`Runner::resume`].
    Suspended(SuspendRequest),
    /// The workflow reached `End`; the final state is returned.
    Completed(Box<WorkflowState>),
}

#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    #[error("session not found: {session_id}")]
    #[diagnostic(
        code(burnish::runner::session_not_found),
        help("start the session first, or check the session id")
    )]
    SessionNotFound { session_id: String },

    #[error("session already exists: {session_id}")]
    #[diagnostic(
        code(burnish::runner::session_exists),
        help("resume the existing session or pick a different id")
    )]
    SessionExists { session_id: String },

    #[error("session {session_id} is not suspended (status: {status})")]
    #[diagnostic(
        code(burnish::runner::not_suspended),
        help("only a suspended session can accept an answer")
    )]
    NotSuspended {
        session_id: String,
        status: RunStatus,
    },

    #[error("no executable node registered for {node}")]
    #[diagnostic(code(burnish::runner::missing_node))]
    MissingNode { node: NodeId },

    #[error("step limit of {limit} exceeded without suspension or completion")]
    #[diagnostic(
        code(burnish::runner::step_limit),
        help("a routing cycle is the likely cause; inspect the session's step history")
    )]
    StepLimitExceeded { limit: u64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Checkpointer(#[from] CheckpointerError),
}

/// Runtime execution engine with session management and checkpointing.
pub struct Runner {
    graph: Arc<WorkflowGraph>,
    sessions: FxHashMap<String, SessionState>,
    checkpointer: Arc<dyn Checkpointer>,
    autosave: bool,
    /// Safety bound on node executions per drive; a healthy session
    /// suspends or completes long before hitting it.
    step_limit: u64,
}

impl Runner {
    /// Runner with in-memory checkpointing, suited to tests and
    /// single-process runs.
    #[must_use]
    pub fn new(graph: Arc<WorkflowGraph>) -> Self {
        Self::with_checkpointer(graph, Arc::new(InMemoryCheckpointer::new()), true)
    }

    #[must_use]
    pub fn with_checkpointer(
        graph: Arc<WorkflowGraph>,
        checkpointer: Arc<dyn Checkpointer>,
        autosave: bool,
    ) -> Self {
        Self {
            graph,
            sessions: FxHashMap::default(),
            checkpointer,
            autosave,
            step_limit: 1000,
        }
    }

    /// Start a fresh session and run until suspension or completion.
    #[instrument(skip(self, experience_data, skill_gaps), err)]
    pub async fn start(
        &mut self,
        session_id: &str,
        experience_data: ExperienceData,
        skill_gaps: Vec<SkillGap>,
    ) -> Result<RunOutcome, RunnerError> {
        if self.sessions.contains_key(session_id)
            || self.checkpointer.load_latest(session_id).await?.is_some()
        {
            return Err(RunnerError::SessionExists {
                session_id: session_id.to_string(),
            });
        }

        let state = WorkflowState::new(experience_data, skill_gaps);
        let cursor = self.graph.entry(&state)?;
        let session = SessionState {
            state,
            cursor,
            status: RunStatus::Running,
            step: 0,
            pending_request: None,
        };
        self.sessions.insert(session_id.to_string(), session);
        tracing::info!(session = %session_id, "session started");
        self.drive(session_id).await
    }

    /// Answer a suspended session and run until the next suspension or
    /// completion.
    ///
    /// The session is restored from its latest checkpoint when not in
    /// memory, which is how a process restart picks up where it left
    /// off. The answer lands in the state's `human_response` slot and
    /// routing continues from the suspended node without re-executing it.
    #[instrument(skip(self, answer), err)]
    pub async fn resume(
        &mut self,
        session_id: &str,
        answer: HumanAnswer,
    ) -> Result<RunOutcome, RunnerError> {
        if !self.sessions.contains_key(session_id) {
            let checkpoint = self.checkpointer.load_latest(session_id).await?.ok_or_else(|| {
                RunnerError::SessionNotFound {
                    session_id: session_id.to_string(),
                }
            })?;
            tracing::info!(
                session = %session_id,
                step = checkpoint.step,
                "session restored from checkpoint"
            );
            self.sessions
                .insert(session_id.to_string(), restore_session_state(&checkpoint));
        }

        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| RunnerError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        if session.status != RunStatus::Suspended {
            return Err(RunnerError::NotSuspended {
                session_id: session_id.to_string(),
                status: session.status,
            });
        }

        StatePatch {
            human_response: Some(Some(answer)),
            ..StatePatch::default()
        }
        .apply(&mut session.state);

        // Route past the interaction node it was parked on.
        let next = self.graph.route(session.cursor, &session.state)?;
        session.cursor = next;
        session.status = RunStatus::Running;
        session.pending_request = None;
        if next.is_end() {
            return self.complete(session_id).await;
        }
        self.drive(session_id).await
    }

    /// The outstanding interaction request for a suspended session, if
    /// the session is in memory.
    #[must_use]
    pub fn pending_request(&self, session_id: &str) -> Option<&SuspendRequest> {
        self.sessions
            .get(session_id)?
            .pending_request
            .as_ref()
    }

    /// Read-only view of an in-memory session.
    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }

    /// Execute nodes from the session's cursor until it suspends or
    /// reaches `End`.
    async fn drive(&mut self, session_id: &str) -> Result<RunOutcome, RunnerError> {
        let graph = Arc::clone(&self.graph);
        let mut executed: u64 = 0;
        loop {
            if executed >= self.step_limit {
                return Err(RunnerError::StepLimitExceeded {
                    limit: self.step_limit,
                });
            }
            executed += 1;

            let (cursor, step) = {
                let session = self.session_mut(session_id)?;
                session.step += 1;
                (session.cursor, session.step)
            };
            let node = graph
                .node(cursor)
                .ok_or(RunnerError::MissingNode { node: cursor })?;
            tracing::debug!(session = %session_id, node = %cursor, step, "executing node");

            let outcome = {
                let session =
                    self.sessions
                        .get(session_id)
                        .ok_or_else(|| RunnerError::SessionNotFound {
                            session_id: session_id.to_string(),
                        })?;
                node.run(&session.state, NodeContext {
                    node_id: cursor,
                    step,
                })
                .await?
            };

            match outcome {
                NodeOutcome::Suspend(request) => {
                    let session = self.session_mut(session_id)?;
                    session.status = RunStatus::Suspended;
                    session.pending_request = Some(request.clone());
                    self.checkpoint(session_id).await;
                    tracing::info!(session = %session_id, node = %cursor, "session suspended");
                    return Ok(RunOutcome::Suspended(request));
                }
                NodeOutcome::Patch(patch) => {
                    let next = {
                        let session = self.session_mut(session_id)?;
                        patch.apply(&mut session.state);
                        graph.route(cursor, &session.state)?
                    };
                    self.session_mut(session_id)?.cursor = next;
                    if next.is_end() {
                        return self.complete(session_id).await;
                    }
                    if self.autosave {
                        self.checkpoint(session_id).await;
                    }
                }
            }
        }
    }

    /// Mark the session completed and persist its final checkpoint.
    async fn complete(&mut self, session_id: &str) -> Result<RunOutcome, RunnerError> {
        let session = self.session_mut(session_id)?;
        session.status = RunStatus::Completed;
        let final_state = Box::new(session.state.clone());
        self.checkpoint(session_id).await;
        tracing::info!(session = %session_id, "session completed");
        Ok(RunOutcome::Completed(final_state))
    }

    fn session_mut(&mut self, session_id: &str) -> Result<&mut SessionState, RunnerError> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| RunnerError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    /// Persist the session's current checkpoint; persistence failures
    /// are logged, not fatal to the run.
    async fn checkpoint(&self, session_id: &str) {
        let Some(session) = self.sessions.get(session_id) else {
            return;
        };
        let checkpoint = Checkpoint {
            session_id: session_id.to_string(),
            step: session.step,
            cursor: session.cursor,
            status: session.status,
            state: session.state.clone(),
            pending_request: session.pending_request.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.checkpointer.save(checkpoint).await {
            tracing::warn!(session = %session_id, error = %e, "checkpoint save failed");
        }
    }
}

/// Rebuild in-memory session state from a persisted checkpoint.
#[must_use]
pub fn restore_session_state(checkpoint: &Checkpoint) -> SessionState {
    SessionState {
        state: checkpoint.state.clone(),
        cursor: checkpoint.cursor,
        status: checkpoint.status,
        step: checkpoint.step,
        pending_request: checkpoint.pending_request.clone(),
    }
}
