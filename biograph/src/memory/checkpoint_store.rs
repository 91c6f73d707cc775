//! CheckpointStore trait and CheckpointError.
//!
//! Saves and loads the latest checkpoint per thread id, lists and deletes threads, and
//! hands out the per-thread lock the executor holds from load to persist.

use async_trait::async_trait;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::thread_locks::ThreadGuard;

/// Error type for checkpoint operations.
///
/// Used by every `CheckpointStore` method and by `Serializer`.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    /// No checkpoint exists for the thread id.
    #[error("thread not found: {0}")]
    NotFound(String),
}

/// Per-thread checkpoint storage.
///
/// Implementations: `MemoryCheckpointStore` (in-memory), `SqliteCheckpointStore`
/// (feature `sqlite`).
///
/// **Interaction**: Constructed once at startup and shared with the executor as
/// `Arc<dyn CheckpointStore<InvocationState>>`.
#[async_trait]
pub trait CheckpointStore<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Latest checkpoint for the thread, or `None` for a thread never seen.
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Stores `checkpoint` as the thread's latest, creating the thread if needed.
    async fn put(&self, thread_id: &str, checkpoint: &Checkpoint<S>)
        -> Result<(), CheckpointError>;

    /// All thread ids with a checkpoint, sorted.
    async fn list(&self) -> Result<Vec<String>, CheckpointError>;

    /// Deletes the thread; `NotFound` when it does not exist.
    async fn delete(&self, thread_id: &str) -> Result<(), CheckpointError>;

    /// Deletes every thread and returns how many were removed.
    ///
    /// Takes no thread locks: a run in flight still persists its thread afterwards.
    async fn clear(&self) -> Result<usize, CheckpointError>;

    /// Exclusive access to the thread until the guard drops.
    async fn lock(&self, thread_id: &str) -> ThreadGuard;
}

pub(crate) fn require_thread_id(thread_id: &str) -> Result<(), CheckpointError> {
    if thread_id.trim().is_empty() {
        return Err(CheckpointError::ThreadIdRequired);
    }
    Ok(())
}
