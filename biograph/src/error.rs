//! Execution error types.
//!
//! `AgentError` is returned by `Node::run` and by `CompiledStateGraph::invoke` when a
//! failure is not contained inside a node. `CapabilityError` is what the external
//! capability traits (LLM, query engine, retriever) return; nodes convert it into
//! degraded text instead of propagating it.

use thiserror::Error;

use crate::graph::{Branch, NodeId};
use crate::memory::CheckpointError;

/// Error from an external capability (LLM, structured query engine, retrieval store).
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// LLM invocation failed (transport, API error, empty response).
    #[error("llm: {0}")]
    Llm(String),
    /// The query engine could not produce a query (or its schema).
    #[error("query generation: {0}")]
    QueryGeneration(String),
    /// The query engine rejected or failed to execute a query.
    #[error("query execution: {0}")]
    QueryExecution(String),
    /// Similarity search failed.
    #[error("retrieval: {0}")]
    Retrieval(String),
    /// No LLM provider is registered at all, so no fallback is possible.
    #[error("no llm provider configured")]
    NoProvider,
}

/// Graph execution error.
///
/// Only failures that no node contained end up here; the executor converts them
/// into a well-formed response at its boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The query was empty or whitespace only; nothing ran.
    #[error("query must not be empty")]
    EmptyQuery,

    /// A router produced a key that has no entry in the compiled routing table.
    #[error("no route from {from} for branch {branch}")]
    UnroutedBranch { from: NodeId, branch: Branch },

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
