//! Stand-in query engine for tests and offline runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::llm::LlmClient;
use crate::query::{generate_with_llm, QueryEngine};

/// Schema reported by the stand-in; matches the table `SqliteQueryEngine` bootstraps.
pub const GSE_SCHEMA: &str =
    "CREATE TABLE gse (id INTEGER PRIMARY KEY, accession TEXT, title TEXT)";

/// Query engine with canned behavior.
///
/// Without `with_sql` it generates through the LLM like a real engine; `execute` returns
/// the configured result and records every statement it was given.
pub struct MockQueryEngine {
    schema: Result<String, String>,
    sql: Option<Result<String, String>>,
    result: Result<String, String>,
    executed: Mutex<Vec<String>>,
}

impl MockQueryEngine {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            schema: Ok(GSE_SCHEMA.to_string()),
            sql: None,
            result: Ok(result.into()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Always generate `sql`, ignoring the LLM (builder).
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(Ok(sql.into()));
        self
    }

    /// Make schema lookup fail (builder).
    pub fn failing_schema(mut self, message: impl Into<String>) -> Self {
        self.schema = Err(message.into());
        self
    }

    /// Make generation fail (builder).
    pub fn failing_generation(mut self, message: impl Into<String>) -> Self {
        self.sql = Some(Err(message.into()));
        self
    }

    /// Make execution fail (builder).
    pub fn failing_execution(mut self, message: impl Into<String>) -> Self {
        self.result = Err(message.into());
        self
    }

    /// Statements passed to `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QueryEngine for MockQueryEngine {
    async fn schema(&self) -> Result<String, CapabilityError> {
        self.schema.clone().map_err(CapabilityError::QueryGeneration)
    }

    async fn generate(
        &self,
        llm: &dyn LlmClient,
        question: &str,
        schema: &str,
    ) -> Result<String, CapabilityError> {
        match &self.sql {
            Some(sql) => sql.clone().map_err(CapabilityError::QueryGeneration),
            None => generate_with_llm(llm, question, schema).await,
        }
    }

    async fn execute(&self, sql: &str) -> Result<String, CapabilityError> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
        self.result.clone().map_err(CapabilityError::QueryExecution)
    }
}
