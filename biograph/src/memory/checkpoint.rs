//! Checkpoint and metadata types.
//!
//! A checkpoint is the last-known state of one thread plus when and how it was written.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Metadata for a single checkpoint (source, step, created_at).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Number of completed runs on the thread, this one included.
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// What produced the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// First run on a new thread.
    Input,
    /// A later run on an existing thread.
    Loop,
}

/// One checkpoint: state snapshot + id/ts.
///
/// Stored by a `CheckpointStore` keyed by thread id; a newer checkpoint replaces the
/// older one.
///
/// **Interaction**: Produced by `Executor::resolve` after a successful run; consumed by
/// `CheckpointStore::put`, returned by `CheckpointStore::get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from current state. Uses current time for id/ts.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let id = format!("{}-{}", ts, step);
        Self {
            id,
            ts,
            channel_values: state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }

    /// Source and step for the checkpoint that follows `previous`.
    pub fn next_step(previous: Option<&Checkpoint<S>>) -> (CheckpointSource, u64) {
        match previous {
            None => (CheckpointSource::Input, 1),
            Some(cp) => (CheckpointSource::Loop, cp.metadata.step + 1),
        }
    }
}
