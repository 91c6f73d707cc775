//! # Memory: per-thread checkpoints
//!
//! Each conversation thread keeps its latest [`Checkpoint`]; the executor loads it
//! before a run, carries the message history forward, and writes a new checkpoint
//! after a successful run.
//!
//! ## Store implementations
//!
//! | Type                      | Persistence | Use case                 | Feature  |
//! |---------------------------|-------------|--------------------------|----------|
//! | [`MemoryCheckpointStore`] | In-memory   | Dev, tests               | —        |
//! | `SqliteCheckpointStore`   | SQLite file | Single node, restarts    | `sqlite` |
//!
//! Both serialize runs on the same thread through [`ThreadLocks`]; see
//! [`CheckpointStore::lock`].

mod checkpoint;
mod checkpoint_store;
mod memory_store;
mod serializer;
mod thread_locks;

#[cfg(feature = "sqlite")]
mod sqlite_store;

pub use checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use memory_store::MemoryCheckpointStore;
pub use serializer::{JsonSerializer, Serializer};
pub use thread_locks::{ThreadGuard, ThreadLocks};

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteCheckpointStore;
