//! State graph: nodes + direct and conditional edges, compile and invoke.
//!
//! Nodes and routing keys are closed enums ([`NodeId`], [`Branch`]); the edge table is
//! validated once by [`StateGraph::compile`] so routing cannot meet an unknown key at run time
//! unless a router returns a key it did not declare.

mod compile_error;
mod compiled;
mod logging;
mod node;
mod node_id;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, RunOutcome};
pub use node::{ContainedFailure, FailureKind, GraphState, Node, NodeOutput};
pub use node_id::{Branch, NodeId, Target, END};
pub use run_context::RunContext;
pub use state_graph::StateGraph;
