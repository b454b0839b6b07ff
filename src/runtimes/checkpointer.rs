//! Checkpointer abstraction and the in-memory reference backend.
//!
//! A checkpoint captures everything needed to restore a session after a
//! process restart: the full workflow state, the cursor the session is
//! parked at, its run status, and the pending interaction request when
//! suspended. Backends store the latest checkpoint per session; the
//! SQLite backend additionally keeps step history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::interact::SuspendRequest;
use crate::state::WorkflowState;
use crate::types::NodeId;

/// Where a session currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Executing nodes; only observed in autosaved mid-run checkpoints.
    Running,
    /// Parked on an interaction node, waiting for a human answer.
    Suspended,
    /// Reached `End`; the final state is in the checkpoint.
    Completed,
}

impl RunStatus {
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Suspended => "suspended",
            RunStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn decode(s: &str) -> Option<Self> {
        match s {
            "running" => Some(RunStatus::Running),
            "suspended" => Some(RunStatus::Suspended),
            "completed" => Some(RunStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.encode())
    }
}

/// One durable snapshot of a session.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    pub session_id: String,
    pub step: u64,
    /// The node the session is parked at. For a suspended session this
    /// is the interaction node awaiting its answer; resume routes from
    /// here without re-executing it.
    pub cursor: NodeId,
    pub status: RunStatus,
    pub state: WorkflowState,
    /// The outstanding request when suspended, so a cold restart can
    /// re-present it without re-running the node.
    pub pending_request: Option<SuspendRequest>,
    pub created_at: DateTime<Utc>,
}

/// Errors surfaced by checkpoint backends.
#[derive(Debug, Error, Diagnostic)]
pub enum CheckpointerError {
    #[error("checkpoint backend error: {message}")]
    #[diagnostic(
        code(burnish::checkpointer::backend),
        help("check that the backing store is reachable and writable")
    )]
    Backend { message: String },

    #[error("checkpoint serialization failed: {message}")]
    #[diagnostic(code(burnish::checkpointer::serde))]
    Serde { message: String },
}

pub type Result<T> = std::result::Result<T, CheckpointerError>;

/// Durable storage for session checkpoints.
///
/// `save` replaces the latest checkpoint for the session atomically;
/// `load_latest` returns it, or `None` for an unknown session.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn save(&self, checkpoint: Checkpoint) -> Result<()>;
    async fn load_latest(&self, session_id: &str) -> Result<Option<Checkpoint>>;
    async fn list_sessions(&self) -> Result<Vec<String>>;
}

/// Non-durable checkpointer keeping the latest checkpoint per session.
///
/// Suited to tests and single-process runs where restart recovery is
/// not needed.
#[derive(Default)]
pub struct InMemoryCheckpointer {
    store: Mutex<FxHashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        self.store
            .lock()
            .insert(checkpoint.session_id.clone(), checkpoint);
        Ok(())
    }

    async fn load_latest(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.store.lock().get(session_id).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<String>> {
        Ok(self.store.lock().keys().cloned().collect())
    }
}
