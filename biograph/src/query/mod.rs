//! Structured-query capability: schema discovery, SQL generation and execution.
//!
//! `QueryEngine` is what the structured resolver talks to. `generate` has a default that
//! prompts the run's LLM with [`SQL_TEMPLATE`](crate::prompts::SQL_TEMPLATE); engines only
//! need to describe their schema and run a query.

mod mock;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use mock::{MockQueryEngine, GSE_SCHEMA};
#[cfg(feature = "sqlite")]
pub use sqlite::{database_path, GseRecord, SqliteQueryEngine};

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::llm::LlmClient;
use crate::prompts::sql_prompt;

/// Structured-data backend for the catalog.
///
/// **Interaction**: Held by `StructuredResolverNode` as `Arc<dyn QueryEngine>`.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Human-readable schema (DDL) included in the generation prompt.
    async fn schema(&self) -> Result<String, CapabilityError>;

    /// Produces raw query text for `question`. The caller sanitizes it with [`clean_sql`].
    async fn generate(
        &self,
        llm: &dyn LlmClient,
        question: &str,
        schema: &str,
    ) -> Result<String, CapabilityError> {
        generate_with_llm(llm, question, schema).await
    }

    /// Runs `sql` and returns the rows rendered as text.
    async fn execute(&self, sql: &str) -> Result<String, CapabilityError>;
}

/// Asks `llm` for a query using the SQL template.
pub async fn generate_with_llm(
    llm: &dyn LlmClient,
    question: &str,
    schema: &str,
) -> Result<String, CapabilityError> {
    llm.complete(&sql_prompt(schema, question)).await
}

/// Strips Markdown code fences (```` ```sql ```` and ```` ``` ````) and `--` line comments,
/// then trims. Returns an empty string when nothing but decoration was generated.
pub fn clean_sql(raw: &str) -> String {
    let mut unfenced = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        unfenced.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if let Some(after) = rest.strip_prefix("sql") {
            rest = after.trim_start();
        }
    }
    unfenced.push_str(rest);

    unfenced
        .lines()
        .map(|line| match line.find("--") {
            Some(i) => &line[..i],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
