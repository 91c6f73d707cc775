//! SQLite-backed checkpoint store (SqliteCheckpointStore). Persistent across process restarts.
//!
//! One row per thread: the latest checkpoint serialized as JSON. Every call opens its own
//! connection inside `spawn_blocking`.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::memory::checkpoint::Checkpoint;
use crate::memory::checkpoint_store::{require_thread_id, CheckpointError, CheckpointStore};
use crate::memory::serializer::{JsonSerializer, Serializer};
use crate::memory::thread_locks::{ThreadGuard, ThreadLocks};

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn open(path: &Path) -> Result<Connection, CheckpointError> {
    let conn = Connection::open(path).map_err(storage)?;
    conn.busy_timeout(Duration::from_secs(5)).map_err(storage)?;
    Ok(conn)
}

/// SQLite-backed store. Key: thread_id. Value: `Checkpoint<S>` as JSON.
///
/// **Interaction**: Selected by `build_executor` when `CHECKPOINT_DB_PATH` is set.
pub struct SqliteCheckpointStore<S> {
    db_path: PathBuf,
    serializer: JsonSerializer,
    locks: ThreadLocks,
    _state: PhantomData<fn() -> S>,
}

impl<S> SqliteCheckpointStore<S> {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = open(&db_path)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id TEXT PRIMARY KEY,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                payload BLOB NOT NULL
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer: JsonSerializer,
            locks: ThreadLocks::new(),
            _state: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Threads whose lock is currently held or awaited.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }
}

#[async_trait]
impl<S> CheckpointStore<S> for SqliteCheckpointStore<S>
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let thread_id = thread_id.to_string();
        let db_path = self.db_path.clone();

        let payload = tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            conn.query_row(
                "SELECT payload FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        match payload {
            Some(bytes) => Ok(Some(self.serializer.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        thread_id: &str,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        require_thread_id(thread_id)?;
        let payload = self.serializer.serialize(checkpoint)?;
        let thread_id = thread_id.to_string();
        let checkpoint_id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            conn.execute(
                "INSERT OR REPLACE INTO checkpoints (thread_id, checkpoint_id, ts, payload) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![thread_id, checkpoint_id, ts, payload],
            )
            .map_err(storage)?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(storage)?
    }

    async fn list(&self) -> Result<Vec<String>, CheckpointError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            let mut stmt = conn
                .prepare("SELECT thread_id FROM checkpoints ORDER BY thread_id")
                .map_err(storage)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(storage)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage)
        })
        .await
        .map_err(storage)?
    }

    async fn delete(&self, thread_id: &str) -> Result<(), CheckpointError> {
        let id = thread_id.to_string();
        let db_path = self.db_path.clone();
        let removed = tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            conn.execute("DELETE FROM checkpoints WHERE thread_id = ?1", params![id])
                .map_err(storage)
        })
        .await
        .map_err(storage)??;

        if removed == 0 {
            return Err(CheckpointError::NotFound(thread_id.to_string()));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize, CheckpointError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            conn.execute("DELETE FROM checkpoints", []).map_err(storage)
        })
        .await
        .map_err(storage)?
    }

    async fn lock(&self, thread_id: &str) -> ThreadGuard {
        self.locks.lock(thread_id).await
    }
}
