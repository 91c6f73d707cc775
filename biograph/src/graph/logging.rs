//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for graph and node lifecycle, shared by the compiled
//! graph's run loop.

use crate::error::AgentError;

use super::{ContainedFailure, NodeId, Target};

/// Log node execution start.
pub fn log_node_start(node_id: NodeId) {
    tracing::debug!(node_id = %node_id, "Starting node execution");
}

/// Log node execution completion and the routing decision taken after it.
pub fn log_node_complete(node_id: NodeId, next: &Target) {
    tracing::debug!(node_id = %node_id, next = %next, "Node execution complete");
}

/// Log a failure the node contained and converted into data.
pub fn log_contained_failure(failure: &ContainedFailure) {
    tracing::warn!(
        node_id = %failure.node,
        kind = %failure.kind,
        message = %failure.message,
        "Node contained a capability failure"
    );
}

/// Log graph execution start.
pub fn log_graph_start(entry: NodeId) {
    tracing::debug!(entry = %entry, "Starting graph execution");
}

/// Log graph execution completion.
pub fn log_graph_complete(path: &[NodeId]) {
    tracing::debug!(?path, "Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(node_id: NodeId, error: &AgentError) {
    tracing::error!(node_id = %node_id, %error, "Graph execution error");
}
