//! In-memory checkpoint store (MemoryCheckpointStore).
//!
//! Not persistent; for dev, tests and single-process runs without `CHECKPOINT_DB_PATH`.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::checkpoint_store::{require_thread_id, CheckpointError, CheckpointStore};
use crate::memory::thread_locks::{ThreadGuard, ThreadLocks};

/// In-memory store keyed by thread id.
///
/// **Interaction**: Used as `Arc<dyn CheckpointStore<S>>` by the executor.
pub struct MemoryCheckpointStore<S> {
    inner: DashMap<String, Checkpoint<S>>,
    locks: ThreadLocks,
}

impl<S> MemoryCheckpointStore<S> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
            locks: ThreadLocks::new(),
        }
    }
}

impl<S> MemoryCheckpointStore<S> {
    /// Threads whose lock is currently held or awaited.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }
}

impl<S> Default for MemoryCheckpointStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> CheckpointStore<S> for MemoryCheckpointStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        Ok(self.inner.get(thread_id).map(|cp| cp.value().clone()))
    }

    async fn put(
        &self,
        thread_id: &str,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        require_thread_id(thread_id)?;
        self.inner.insert(thread_id.to_string(), checkpoint.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, CheckpointError> {
        let mut ids: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, thread_id: &str) -> Result<(), CheckpointError> {
        match self.inner.remove(thread_id) {
            Some(_) => Ok(()),
            None => Err(CheckpointError::NotFound(thread_id.to_string())),
        }
    }

    async fn clear(&self) -> Result<usize, CheckpointError> {
        let n = self.inner.len();
        self.inner.clear();
        Ok(n)
    }

    async fn lock(&self, thread_id: &str) -> ThreadGuard {
        self.locks.lock(thread_id).await
    }
}
