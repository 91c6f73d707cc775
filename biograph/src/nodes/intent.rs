//! Intent classifier: asks the LLM for one label and maps it onto [`Intent`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{ContainedFailure, FailureKind, Node, NodeId, NodeOutput, RunContext};
use crate::prompts::intent_prompt;
use crate::state::{Intent, InvocationState, StateUpdate};

/// Maps a free-form classifier reply onto an intent.
///
/// Case-insensitive substring match in priority order SQL, RAG, BOTH, CHAT; anything
/// else is `Unknown`. A reply like "sql or rag" is therefore `Sql`.
pub fn normalize_intent(reply: &str) -> Intent {
    let reply = reply.trim().to_uppercase();
    if reply.contains("SQL") {
        Intent::Sql
    } else if reply.contains("RAG") {
        Intent::Rag
    } else if reply.contains("BOTH") {
        Intent::Both
    } else if reply.contains("CHAT") {
        Intent::Chat
    } else {
        Intent::Unknown
    }
}

/// Entry node. On LLM failure the intent falls back to `Rag`.
#[derive(Debug, Default)]
pub struct IntentClassifierNode;

#[async_trait]
impl Node<InvocationState> for IntentClassifierNode {
    fn id(&self) -> NodeId {
        NodeId::IntentClassifier
    }

    async fn run(
        &self,
        state: &InvocationState,
        ctx: &RunContext,
    ) -> Result<NodeOutput<StateUpdate>, AgentError> {
        match ctx.llm.complete(&intent_prompt(&state.query)).await {
            Ok(reply) => {
                let intent = normalize_intent(&reply);
                debug!(reply = %reply.trim(), intent = %intent, "classified query");
                Ok(NodeOutput::Updated(StateUpdate::intent(intent)))
            }
            Err(e) => Ok(NodeOutput::Contained {
                update: StateUpdate::intent(Intent::Rag),
                failure: ContainedFailure::new(
                    NodeId::IntentClassifier,
                    FailureKind::Classification,
                    e.to_string(),
                ),
            }),
        }
    }
}
