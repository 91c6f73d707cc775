//! Graph node trait: one stage in a StateGraph.
//!
//! Receives the current state and returns a partial update. Routing is not a node
//! concern; the compiled graph picks the next node from its edge table.

use std::fmt;

use async_trait::async_trait;

use crate::error::AgentError;

use super::{NodeId, RunContext};

/// State type a graph can run over: knows how to apply a node's partial update.
pub trait GraphState: Clone + Send + Sync + 'static {
    type Update: Send;

    fn apply(&mut self, update: Self::Update);
}

/// Which stage contained a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Intent classification failed; the classifier fell back to retrieval.
    Classification,
    /// Query generation or execution failed; the error text became `sql_answer`.
    StructuredResolver,
    /// Search or answer generation failed; the error text became `rag_answer`.
    RetrievalResolver,
    /// The chat reply failed; the error text became `answer`.
    Conversation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Classification => "classification",
            FailureKind::StructuredResolver => "structured_resolver",
            FailureKind::RetrievalResolver => "retrieval_resolver",
            FailureKind::Conversation => "conversation",
        };
        f.write_str(s)
    }
}

/// A failure a node handled itself and turned into degraded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedFailure {
    pub node: NodeId,
    pub kind: FailureKind,
    pub message: String,
}

impl ContainedFailure {
    pub fn new(node: NodeId, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            node,
            kind,
            message: message.into(),
        }
    }
}

/// Result of one node step.
///
/// Both variants carry an update the runner applies; `Contained` additionally records
/// what went wrong so callers and tests can tell a degraded result from a clean one.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput<U> {
    Updated(U),
    Contained { update: U, failure: ContainedFailure },
}

impl<U> NodeOutput<U> {
    pub fn update(&self) -> &U {
        match self {
            NodeOutput::Updated(u) => u,
            NodeOutput::Contained { update, .. } => update,
        }
    }

    pub fn failure(&self) -> Option<&ContainedFailure> {
        match self {
            NodeOutput::Updated(_) => None,
            NodeOutput::Contained { failure, .. } => Some(failure),
        }
    }

    pub fn is_contained(&self) -> bool {
        matches!(self, NodeOutput::Contained { .. })
    }
}

/// One stage in a graph: state in, partial update out.
///
/// Capability failures should be returned as `NodeOutput::Contained`; an `Err` is
/// reserved for failures the node cannot turn into data.
///
/// **Interaction**: Registered with `StateGraph::add_node`; driven by
/// `CompiledStateGraph::invoke`, which passes the per-run `RunContext`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id; unique within a graph.
    fn id(&self) -> NodeId;

    async fn run(&self, state: &S, ctx: &RunContext) -> Result<NodeOutput<S::Update>, AgentError>;
}
