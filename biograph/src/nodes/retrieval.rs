//! Retrieval resolver: search passages, fill the RAG template, ask the LLM.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{ContainedFailure, FailureKind, Node, NodeId, NodeOutput, RunContext};
use crate::prompts::rag_prompt;
use crate::retrieval::Retriever;
use crate::state::{InvocationState, StateUpdate};

/// Passages fetched per query when not configured.
pub const DEFAULT_TOP_K: usize = 4;

/// Answers from the knowledge base; failures become the text of `rag_answer`.
pub struct RetrievalResolverNode {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
}

impl RetrievalResolverNode {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn contained(text: String, message: String) -> NodeOutput<StateUpdate> {
        NodeOutput::Contained {
            update: StateUpdate::rag_answer(text),
            failure: ContainedFailure::new(
                NodeId::RetrievalResolver,
                FailureKind::RetrievalResolver,
                message,
            ),
        }
    }
}

#[async_trait]
impl Node<InvocationState> for RetrievalResolverNode {
    fn id(&self) -> NodeId {
        NodeId::RetrievalResolver
    }

    async fn run(
        &self,
        state: &InvocationState,
        ctx: &RunContext,
    ) -> Result<NodeOutput<StateUpdate>, AgentError> {
        let passages = match self.retriever.search(&state.query, self.top_k).await {
            Ok(p) => p,
            Err(e) => {
                return Ok(Self::contained(
                    format!("Retrieval error: {}", e),
                    e.to_string(),
                ))
            }
        };
        debug!(passages = passages.len(), top_k = self.top_k, "retrieved passages");

        let context = passages.join("\n\n");
        match ctx.llm.complete(&rag_prompt(&context, &state.query)).await {
            Ok(answer) => Ok(NodeOutput::Updated(StateUpdate::rag_answer(answer))),
            Err(e) => Ok(Self::contained(
                format!("Error while generating answer: {}", e),
                e.to_string(),
            )),
        }
    }
}
