/*!
SQLite checkpointer.

Implements the [`Checkpointer`] trait over a SQLite database. The
latest checkpoint per session is denormalized into the `sessions` table
for fast restore; every step is also appended to the `steps` table so
a session's full history remains inspectable with plain SQL.

When the `sqlite-migrations` feature is enabled (default), embedded
migrations (`sqlx::migrate!("./migrations")`) run on connect; disabling
the feature assumes external migration orchestration.
*/

use std::sync::Arc;

use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::runtimes::checkpointer::{Checkpoint, Checkpointer, CheckpointerError, Result};
use crate::runtimes::persistence::PersistedCheckpoint;

/// SQLite-backed checkpointer with step history.
///
/// Storage grows roughly with `(sessions x steps_per_session x
/// state_size)`. For long-running deployments, prune old `steps` rows
/// periodically; `created_at` on steps and `updated_at` on sessions
/// exist to support time-based cleanup.
pub struct SqliteCheckpointer {
    pool: Arc<SqlitePool>,
}

impl std::fmt::Debug for SqliteCheckpointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCheckpointer").finish()
    }
}

impl SqliteCheckpointer {
    /// Connect (or create) a SQLite database at `database_url`.
    /// Example URL: "sqlite://burnish.db"
    #[must_use = "checkpointer must be used to persist state"]
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        // SQLite will not create the file on connect; make sure it
        // exists first (ignoring races with a concurrent creator).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.trim();
            if !path.is_empty() {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if !p.exists() {
                    let _ = std::fs::File::create_new(p);
                }
            }
        }

        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| CheckpointerError::Backend {
                message: format!("connect error: {e}"),
            })?;

        #[cfg(feature = "sqlite-migrations")]
        {
            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                return Err(CheckpointerError::Backend {
                    message: format!("migration failure: {e}"),
                });
            }
        }

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait::async_trait]
impl Checkpointer for SqliteCheckpointer {
    #[instrument(skip(self, checkpoint), err)]
    async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        let persisted = PersistedCheckpoint::from(&checkpoint);
        let checkpoint_json =
            persisted
                .to_json_string()
                .map_err(|e| CheckpointerError::Serde {
                    message: e.to_string(),
                })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CheckpointerError::Backend {
                message: format!("tx begin: {e}"),
            })?;

        // Denormalized latest checkpoint on the session row.
        sqlx::query(
            r#"
            INSERT INTO sessions (id, last_step, last_cursor, last_status, last_checkpoint_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                last_step = excluded.last_step,
                last_cursor = excluded.last_cursor,
                last_status = excluded.last_status,
                last_checkpoint_json = excluded.last_checkpoint_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&checkpoint.session_id)
        .bind(checkpoint.step as i64)
        .bind(&persisted.cursor)
        .bind(&persisted.status)
        .bind(&checkpoint_json)
        .bind(&persisted.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| CheckpointerError::Backend {
            message: format!("upsert session: {e}"),
        })?;

        // Append to step history (idempotent re-save of the same step).
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO steps (session_id, step, cursor, status, checkpoint_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&checkpoint.session_id)
        .bind(checkpoint.step as i64)
        .bind(&persisted.cursor)
        .bind(&persisted.status)
        .bind(&checkpoint_json)
        .bind(&persisted.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| CheckpointerError::Backend {
            message: format!("insert step: {e}"),
        })?;

        tx.commit().await.map_err(|e| CheckpointerError::Backend {
            message: format!("tx commit: {e}"),
        })?;

        Ok(())
    }

    #[instrument(skip(self, session_id), err)]
    async fn load_latest(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let row = sqlx::query(
            r#"
            SELECT last_checkpoint_json FROM sessions WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| CheckpointerError::Backend {
            message: format!("select latest: {e}"),
        })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let checkpoint_json: Option<String> =
            row.try_get("last_checkpoint_json")
                .map_err(|e| CheckpointerError::Backend {
                    message: format!("last_checkpoint_json read: {e}"),
                })?;
        let Some(checkpoint_json) = checkpoint_json else {
            // Session row exists but no checkpoint has been persisted yet.
            return Ok(None);
        };

        let persisted = PersistedCheckpoint::from_json_str(&checkpoint_json).map_err(|e| {
            CheckpointerError::Serde {
                message: e.to_string(),
            }
        })?;
        let checkpoint = Checkpoint::try_from(persisted).map_err(|e| CheckpointerError::Serde {
            message: e.to_string(),
        })?;
        Ok(Some(checkpoint))
    }

    #[instrument(skip(self), err)]
    async fn list_sessions(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM sessions ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| CheckpointerError::Backend {
            message: format!("list sessions: {e}"),
        })?;

        Ok(rows.into_iter().map(|r| r.get::<String, _>("id")).collect())
    }
}

impl SqliteCheckpointer {
    /// Load the step history for a session, oldest first.
    #[instrument(skip(self), err)]
    pub async fn load_history(&self, session_id: &str) -> Result<Vec<Checkpoint>> {
        let rows = sqlx::query(
            r#"
            SELECT checkpoint_json FROM steps
            WHERE session_id = ?1
            ORDER BY step ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| CheckpointerError::Backend {
            message: format!("select history: {e}"),
        })?;

        let mut checkpoints = Vec::with_capacity(rows.len());
        for row in rows {
            let checkpoint_json: String = row.get("checkpoint_json");
            let persisted = PersistedCheckpoint::from_json_str(&checkpoint_json).map_err(|e| {
                CheckpointerError::Serde {
                    message: e.to_string(),
                }
            })?;
            checkpoints.push(Checkpoint::try_from(persisted).map_err(|e| {
                CheckpointerError::Serde {
                    message: e.to_string(),
                }
            })?);
        }
        Ok(checkpoints)
    }
}
