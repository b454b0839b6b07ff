/*!
Persistence primitives for serializing and deserializing checkpoints
(used by the SQLite checkpointer and any future persistent backends).

Design goals:
- Provide explicit serde-friendly structs decoupled from in-memory
  representations.
- Keep conversion logic localized (From / TryFrom impls) so backend
  code stays lean and declarative.
- Encode node ids and run statuses as strings so persisted data stays
  inspectable with plain SQL.

This module performs no I/O; it is pure data transformation glue.
*/

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interact::SuspendRequest;
use crate::runtimes::checkpointer::{Checkpoint, RunStatus};
use crate::state::WorkflowState;
use crate::types::NodeId;

/// Full persisted checkpoint representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedCheckpoint {
    pub session_id: String,
    pub step: u64,
    /// Cursor encoded via `NodeId::encode()`.
    pub cursor: String,
    /// Status encoded via `RunStatus::encode()`.
    pub status: String,
    pub state: WorkflowState,
    #[serde(default)]
    pub pending_request: Option<SuspendRequest>,
    /// RFC3339 string form of creation time.
    pub created_at: String,
}

/// Conversion and serialization errors for persistence models.
#[derive(Debug, Error, Diagnostic)]
pub enum PersistenceError {
    #[error("unknown node id in persisted checkpoint: {0}")]
    #[diagnostic(
        code(burnish::persistence::unknown_node),
        help("the checkpoint was written by an incompatible version; it cannot be restored")
    )]
    UnknownNode(String),

    #[error("unknown run status in persisted checkpoint: {0}")]
    #[diagnostic(code(burnish::persistence::unknown_status))]
    UnknownStatus(String),

    #[error("JSON serialization/deserialization failed: {source}")]
    #[diagnostic(
        code(burnish::persistence::serde),
        help("ensure the JSON structure matches the PersistedCheckpoint shape")
    )]
    Serde {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

impl PersistedCheckpoint {
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| PersistenceError::Serde { source })
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|source| PersistenceError::Serde { source })
    }
}

impl From<&Checkpoint> for PersistedCheckpoint {
    fn from(cp: &Checkpoint) -> Self {
        PersistedCheckpoint {
            session_id: cp.session_id.clone(),
            step: cp.step,
            cursor: cp.cursor.encode().to_string(),
            status: cp.status.encode().to_string(),
            state: cp.state.clone(),
            pending_request: cp.pending_request.clone(),
            created_at: cp.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<PersistedCheckpoint> for Checkpoint {
    type Error = PersistenceError;

    fn try_from(p: PersistedCheckpoint) -> Result<Self> {
        let cursor =
            NodeId::decode(&p.cursor).ok_or_else(|| PersistenceError::UnknownNode(p.cursor.clone()))?;
        let status = RunStatus::decode(&p.status)
            .ok_or_else(|| PersistenceError::UnknownStatus(p.status.clone()))?;
        // A malformed timestamp degrades to now rather than blocking restore.
        let created_at = DateTime::parse_from_rfc3339(&p.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Ok(Checkpoint {
            session_id: p.session_id,
            step: p.step,
            cursor,
            status,
            state: p.state,
            pending_request: p.pending_request,
            created_at,
        })
    }
}
