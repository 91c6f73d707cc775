//! Contained node failures and the executor's error envelope.

use std::sync::Arc;

use async_trait::async_trait;
use biograph::{
    build_workflow_graph, Checkpoint, CheckpointError, CheckpointStore, Executor, FailureKind,
    InvocationState, MemoryCheckpointStore, MockLlm, MockQueryEngine, MockRetriever, NodeId,
    QueryRequest, ThreadGuard, WorkflowOptions,
};

use crate::common::{harness_with, llm_classifying, registry_with, CLASSIFY, GENERATE_SQL};

/// **Scenario**: Classifier LLM failure → rag path, response still clean.
#[tokio::test]
async fn classifier_failure_falls_back_to_rag() {
    let h = harness_with(
        MockLlm::new("rag reply").fail_when(CLASSIFY, "quota exceeded"),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::new(["p"]),
    );
    let res = h
        .executor
        .resolve_detailed(QueryRequest::new("anything").with_thread("t"))
        .await;
    let outcome = res.outcome.as_ref().unwrap();
    assert_eq!(
        outcome.path,
        vec![NodeId::IntentClassifier, NodeId::RetrievalResolver, NodeId::Aggregator]
    );
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].kind, FailureKind::Classification);

    let resp = res.into_response();
    assert_eq!(resp.intent, "rag");
    assert_eq!(resp.answer, "Knowledge base result:\nrag reply");
    assert!(resp.error.is_none());
}

/// **Scenario**: SQL generation failure becomes the SQL section text; nothing executes.
#[tokio::test]
async fn generation_failure_is_sql_section_text() {
    let h = harness_with(
        MockLlm::new("x")
            .when(CLASSIFY, "SQL")
            .fail_when(GENERATE_SQL, "model down"),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::new(["p"]),
    );
    let resp = h.executor.resolve(QueryRequest::new("How many?")).await;
    assert_eq!(
        resp.sql_result.as_deref(),
        Some("Failed to generate SQL query: llm: model down")
    );
    assert!(resp.error.is_none());
    assert!(h.engine.executed().is_empty());
}

/// **Scenario**: SQL execution failure keeps the generated query in the section text.
#[tokio::test]
async fn execution_failure_keeps_query() {
    let h = harness_with(
        llm_classifying("SQL"),
        MockQueryEngine::new("").failing_execution("no such table: samples"),
        MockRetriever::new(["p"]),
    );
    let resp = h.executor.resolve(QueryRequest::new("How many?")).await;
    assert_eq!(
        resp.sql_result.as_deref(),
        Some("Query: SELECT COUNT(*) FROM gse\n\nError: query execution: no such table: samples")
    );
    assert!(resp.answer.starts_with("SQL database result:\n"));
}

/// **Scenario**: both intent with a broken SQL stage still runs retrieval.
#[tokio::test]
async fn both_continues_after_sql_failure() {
    let h = harness_with(
        llm_classifying("BOTH"),
        MockQueryEngine::new("").failing_schema("database locked"),
        MockRetriever::new(["p"]),
    );
    let resp = h.executor.resolve(QueryRequest::new("q")).await;
    assert!(resp
        .sql_result
        .as_deref()
        .unwrap()
        .starts_with("Failed to generate SQL query:"));
    assert_eq!(resp.rag_result.as_deref(), Some("rag reply"));
    assert!(resp.answer.contains("Knowledge base result:\nrag reply"));
}

/// **Scenario**: Retriever failure becomes the knowledge-base section text.
#[tokio::test]
async fn retrieval_failure_is_rag_section_text() {
    let h = harness_with(
        llm_classifying("RAG"),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::failing("index offline"),
    );
    let resp = h.executor.resolve(QueryRequest::new("What is GEO")).await;
    assert_eq!(
        resp.rag_result.as_deref(),
        Some("Retrieval error: retrieval: index offline")
    );
    assert!(resp.error.is_none());
}

/// **Scenario**: Chat LLM failure → apology text, user message still recorded.
#[tokio::test]
async fn chat_failure_keeps_user_message() {
    let h = harness_with(
        MockLlm::new("x")
            .when(CLASSIFY, "CHAT")
            .fail_when("Hello", "timeout"),
        MockQueryEngine::new(""),
        MockRetriever::new(["p"]),
    );
    let resp = h
        .executor
        .resolve(QueryRequest::new("Hello").with_thread("t"))
        .await;
    assert_eq!(
        resp.answer,
        "Sorry, an error occurred while handling your message: llm: timeout"
    );
    let cp = h.store.get("t").await.unwrap().unwrap();
    assert_eq!(cp.channel_values.messages, vec![biograph::Message::user("Hello")]);
}

/// Store whose writes always fail.
struct BrokenStore(MemoryCheckpointStore<InvocationState>);

#[async_trait]
impl CheckpointStore<InvocationState> for BrokenStore {
    async fn get(
        &self,
        thread_id: &str,
    ) -> Result<Option<Checkpoint<InvocationState>>, CheckpointError> {
        self.0.get(thread_id).await
    }

    async fn put(
        &self,
        _thread_id: &str,
        _checkpoint: &Checkpoint<InvocationState>,
    ) -> Result<(), CheckpointError> {
        Err(CheckpointError::Storage("disk full".into()))
    }

    async fn list(&self) -> Result<Vec<String>, CheckpointError> {
        self.0.list().await
    }

    async fn delete(&self, thread_id: &str) -> Result<(), CheckpointError> {
        self.0.delete(thread_id).await
    }

    async fn clear(&self) -> Result<usize, CheckpointError> {
        self.0.clear().await
    }

    async fn lock(&self, thread_id: &str) -> ThreadGuard {
        self.0.lock(thread_id).await
    }
}

/// **Scenario**: A failure outside the nodes → error envelope with intent "error".
#[tokio::test]
async fn store_failure_is_error_envelope() {
    let llm = Arc::new(llm_classifying("SQL"));
    let graph = build_workflow_graph(
        Arc::new(MockQueryEngine::new("[(2)]")),
        Arc::new(MockRetriever::new(["p"])),
        WorkflowOptions::default(),
    )
    .unwrap();
    let executor = Executor::new(
        graph,
        Arc::new(BrokenStore(MemoryCheckpointStore::new())),
        registry_with(llm),
    );

    let resp = executor
        .resolve(QueryRequest::new("How many?").with_thread("t"))
        .await;
    assert!(resp.is_error());
    assert_eq!(resp.intent, "error");
    assert_eq!(resp.error.as_deref(), Some("storage: disk full"));
    assert_eq!(
        resp.answer,
        "Error while processing the query: storage: disk full"
    );
    assert_eq!(resp.thread_id, "t");
    assert_eq!((resp.provider.as_str(), resp.model.as_str()), ("openai", "gpt-4o"));
    assert!(executor.list_threads().await.unwrap().is_empty());
}
