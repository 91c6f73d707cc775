//! Aggregator: merges the structured and retrieval answers into the final answer.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Node, NodeId, NodeOutput, RunContext};
use crate::state::{InvocationState, StateUpdate};

pub const SQL_LABEL: &str = "SQL database result:";
pub const RAG_LABEL: &str = "Knowledge base result:";
pub const NO_INFORMATION: &str = "No relevant information was found.";

/// Labels whichever answers are present. Empty strings count as absent.
pub fn aggregate(sql: Option<&str>, rag: Option<&str>) -> String {
    let sql = sql.filter(|s| !s.is_empty());
    let rag = rag.filter(|s| !s.is_empty());
    match (sql, rag) {
        (Some(s), Some(r)) => format!("{}\n{}\n\n{}\n{}", SQL_LABEL, s, RAG_LABEL, r),
        (Some(s), None) => format!("{}\n{}", SQL_LABEL, s),
        (None, Some(r)) => format!("{}\n{}", RAG_LABEL, r),
        (None, None) => NO_INFORMATION.to_string(),
    }
}

/// Terminal node of every non-chat path. Pure; never fails.
#[derive(Debug, Default)]
pub struct AggregatorNode;

#[async_trait]
impl Node<InvocationState> for AggregatorNode {
    fn id(&self) -> NodeId {
        NodeId::Aggregator
    }

    async fn run(
        &self,
        state: &InvocationState,
        _ctx: &RunContext,
    ) -> Result<NodeOutput<StateUpdate>, AgentError> {
        let answer = aggregate(state.sql_answer.as_deref(), state.rag_answer.as_deref());
        Ok(NodeOutput::Updated(StateUpdate::answer(answer)))
    }
}
