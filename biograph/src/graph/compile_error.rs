//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the routing table is incomplete or the graph
//! is not a DAG reachable from its entry. All of these are build-time failures; a
//! compiled graph never meets them at run time.

use thiserror::Error;

use super::{Branch, NodeId};

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// `set_entry` was never called.
    #[error("graph has no entry node")]
    MissingEntry,

    /// An entry, edge source or edge target was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A router declares a key that has no target in its branch map.
    #[error("branch {branch} from {from} has no target")]
    UndeclaredBranch { from: NodeId, branch: Branch },

    /// A branch map contains a key its router never returns.
    #[error("branch {branch} from {from} is not declared by the router")]
    UnknownBranch { from: NodeId, branch: Branch },

    /// A node has more than one outgoing edge definition.
    #[error("node {0} has more than one outgoing edge")]
    DuplicateEdge(NodeId),

    /// A registered node has no outgoing edge.
    #[error("node {0} has no outgoing edge")]
    MissingEdge(NodeId),

    /// A registered node cannot be reached from the entry.
    #[error("node {0} is unreachable from the entry")]
    Unreachable(NodeId),

    /// Following edges from the entry revisits a node.
    #[error("cycle detected at node {0}")]
    Cycle(NodeId),
}
