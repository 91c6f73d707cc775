//! Structured resolver: generate SQL, sanitize, execute, format.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AgentError, CapabilityError};
use crate::graph::{ContainedFailure, FailureKind, Node, NodeId, NodeOutput, RunContext};
use crate::llm::LlmClient;
use crate::query::{clean_sql, QueryEngine};
use crate::state::{InvocationState, StateUpdate};

/// Answers from the catalog database; failures become the text of `sql_answer`.
pub struct StructuredResolverNode {
    engine: Arc<dyn QueryEngine>,
}

impl StructuredResolverNode {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    async fn generate(&self, llm: &dyn LlmClient, question: &str) -> Result<String, CapabilityError> {
        let schema = self.engine.schema().await?;
        let raw = self.engine.generate(llm, question, &schema).await?;
        let sql = clean_sql(&raw);
        if sql.is_empty() {
            return Err(CapabilityError::QueryGeneration(
                "model returned no SQL statement".to_string(),
            ));
        }
        debug!(raw = %raw, sql = %sql, "generated sql");
        Ok(sql)
    }

    fn contained(text: String, message: String) -> NodeOutput<StateUpdate> {
        NodeOutput::Contained {
            update: StateUpdate::sql_answer(text),
            failure: ContainedFailure::new(
                NodeId::StructuredResolver,
                FailureKind::StructuredResolver,
                message,
            ),
        }
    }
}

#[async_trait]
impl Node<InvocationState> for StructuredResolverNode {
    fn id(&self) -> NodeId {
        NodeId::StructuredResolver
    }

    async fn run(
        &self,
        state: &InvocationState,
        ctx: &RunContext,
    ) -> Result<NodeOutput<StateUpdate>, AgentError> {
        let sql = match self.generate(ctx.llm.as_ref(), &state.query).await {
            Ok(sql) => sql,
            Err(e) => {
                return Ok(Self::contained(
                    format!("Failed to generate SQL query: {}", e),
                    e.to_string(),
                ))
            }
        };

        match self.engine.execute(&sql).await {
            Ok(result) => Ok(NodeOutput::Updated(StateUpdate::sql_answer(format!(
                "Query: {}\n\nResult: {}",
                sql, result
            )))),
            Err(e) => Ok(Self::contained(
                format!("Query: {}\n\nError: {}", sql, e),
                e.to_string(),
            )),
        }
    }
}
