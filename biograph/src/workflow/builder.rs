//! Declares the workflow graph.
//!
//! ```text
//! intent_classifier ─ sql/both ─▶ structured_resolver ─ retrieve ─▶ retrieval_resolver ─▶ aggregator ─▶ END
//!        │                               └──────────── aggregate ─────────────────────────▲
//!        ├─ rag/unknown ─▶ retrieval_resolver
//!        └─ chat ─▶ conversation ─▶ END
//! ```

use std::sync::Arc;

use crate::graph::{Branch, CompilationError, CompiledStateGraph, NodeId, StateGraph, END};
use crate::nodes::{
    AggregatorNode, ConversationNode, IntentClassifierNode, RetrievalResolverNode,
    StructuredResolverNode, DEFAULT_MAX_HISTORY_MESSAGES, DEFAULT_TOP_K,
};
use crate::query::QueryEngine;
use crate::retrieval::Retriever;
use crate::state::{Intent, InvocationState};

/// Tunables passed to the stage nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Passages fetched by the retrieval resolver.
    pub retrieval_top_k: usize,
    /// Conversation history cap; 0 disables it.
    pub max_history_messages: usize,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            retrieval_top_k: DEFAULT_TOP_K,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
        }
    }
}

/// Decision key after classification. A missing intent routes like `rag`.
pub fn route_after_classification(state: &InvocationState) -> Branch {
    Branch::from(state.intent.unwrap_or(Intent::Rag))
}

/// Decision key after the structured stage: `both` and `unknown` continue to retrieval.
pub fn route_after_structured(state: &InvocationState) -> Branch {
    match state.intent {
        Some(Intent::Both) | Some(Intent::Unknown) => Branch::Retrieve,
        _ => Branch::Aggregate,
    }
}

/// Builds and validates the workflow over the given capabilities.
///
/// The LLM is not part of the graph; it arrives per run through `RunContext`.
pub fn build_workflow_graph(
    query_engine: Arc<dyn QueryEngine>,
    retriever: Arc<dyn Retriever>,
    options: WorkflowOptions,
) -> Result<CompiledStateGraph<InvocationState>, CompilationError> {
    let mut graph = StateGraph::<InvocationState>::new();
    graph
        .add_node(Arc::new(IntentClassifierNode))
        .add_node(Arc::new(StructuredResolverNode::new(query_engine)))
        .add_node(Arc::new(
            RetrievalResolverNode::new(retriever).with_top_k(options.retrieval_top_k),
        ))
        .add_node(Arc::new(ConversationNode::new(options.max_history_messages)))
        .add_node(Arc::new(AggregatorNode))
        .set_entry(NodeId::IntentClassifier)
        .add_conditional_edges(
            NodeId::IntentClassifier,
            &[
                Branch::Sql,
                Branch::Rag,
                Branch::Both,
                Branch::Unknown,
                Branch::Chat,
            ],
            route_after_classification,
            [
                (Branch::Sql, NodeId::StructuredResolver),
                (Branch::Rag, NodeId::RetrievalResolver),
                (Branch::Both, NodeId::StructuredResolver),
                (Branch::Unknown, NodeId::RetrievalResolver),
                (Branch::Chat, NodeId::Conversation),
            ],
        )
        .add_conditional_edges(
            NodeId::StructuredResolver,
            &[Branch::Retrieve, Branch::Aggregate],
            route_after_structured,
            [
                (Branch::Retrieve, NodeId::RetrievalResolver),
                (Branch::Aggregate, NodeId::Aggregator),
            ],
        )
        .add_edge(NodeId::RetrievalResolver, NodeId::Aggregator)
        .add_edge(NodeId::Conversation, END)
        .add_edge(NodeId::Aggregator, END);
    graph.compile()
}
