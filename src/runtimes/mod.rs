//! Runtime execution: the session runner and checkpoint backends.

pub mod checkpointer;
pub mod persistence;
pub mod runner;

#[cfg(feature = "sqlite")]
pub mod checkpointer_sqlite;

pub use checkpointer::{
    Checkpoint, Checkpointer, CheckpointerError, InMemoryCheckpointer, RunStatus,
};
pub use persistence::{PersistedCheckpoint, PersistenceError};
pub use runner::{RunOutcome, Runner, RunnerError, SessionState, restore_session_state};

#[cfg(feature = "sqlite")]
pub use checkpointer_sqlite::SqliteCheckpointer;
