//! Per-thread async locks.
//!
//! Serializes the load → run → persist cycle of runs that share a thread id, so two
//! concurrent runs on one thread cannot overwrite each other's history. Runs on
//! different threads never contend. An entry lives only while a guard for its thread
//! is held or awaited; the last guard to drop removes it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Held for the duration of one run on a thread; dropping it releases the thread.
#[derive(Debug)]
pub struct ThreadGuard {
    thread_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl ThreadGuard {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        // Release the mutex first so its Arc count reflects only the map and waiters.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.thread_id, |_, m| Arc::strong_count(m) == 1);
    }
}

/// Map of thread id → mutex. Entries are created on first lock and removed when idle.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    locks: Arc<LockMap>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other guard for `thread_id` is alive, then returns one.
    pub async fn lock(&self, thread_id: &str) -> ThreadGuard {
        // Clone the Arc out so the map shard is not held across the await.
        let mutex = self
            .locks
            .entry(thread_id.to_string())
            .or_default()
            .clone();
        ThreadGuard {
            thread_id: thread_id.to_string(),
            guard: Some(mutex.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    /// Threads with a guard held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
