//! Full requests through the executor, including the SQLite-backed stack.

use biograph::{MockLlm, MockQueryEngine, MockRetriever, QueryRequest};

use crate::common::{harness_with, llm_classifying, CLASSIFY, GENERATE_SQL};

/// **Scenario**: A catalog count question is answered from the SQL stage alone.
#[tokio::test]
async fn sample_count_question_answers_from_sql() {
    let h = harness_with(
        MockLlm::new("unused")
            .when(CLASSIFY, "SQL")
            .when(GENERATE_SQL, "SELECT COUNT(*) FROM samples WHERE gse = 'GSE10000'"),
        MockQueryEngine::new("3 samples"),
        MockRetriever::new(["p"]),
    );
    let resp = h
        .executor
        .resolve(QueryRequest::new("How many samples does GSE10000 have"))
        .await;

    assert_eq!(resp.intent, "sql");
    let sql = resp.sql_result.clone().expect("sql section");
    assert!(sql.contains("SELECT COUNT(*) FROM samples WHERE gse = 'GSE10000'"));
    assert!(sql.contains("3 samples"));
    assert_eq!(resp.answer, format!("SQL database result:\n{}", sql));
    assert!(resp.rag_result.is_none());
    assert!(resp.error.is_none());
    assert_eq!(
        h.engine.executed(),
        vec!["SELECT COUNT(*) FROM samples WHERE gse = 'GSE10000'"]
    );
}

/// **Scenario**: An unavailable provider is replaced by the default, which the response reports.
#[tokio::test]
async fn unavailable_provider_reports_default() {
    let h = harness_with(
        llm_classifying("RAG"),
        MockQueryEngine::new(""),
        MockRetriever::new(["p"]),
    );
    for requested in ["X", "ollama"] {
        let resp = h
            .executor
            .resolve(QueryRequest::new("What is GEO").with_provider(requested))
            .await;
        assert_eq!(resp.provider, "openai", "requested {}", requested);
        assert_eq!(resp.model, "gpt-4o");
        assert!(resp.error.is_none());
    }
}

/// **Scenario**: An explicit model on the default provider is honored and reported.
#[tokio::test]
async fn explicit_model_is_reported() {
    let h = harness_with(
        llm_classifying("CHAT"),
        MockQueryEngine::new(""),
        MockRetriever::new(["p"]),
    );
    let resp = h
        .executor
        .resolve(
            QueryRequest::new("Hello")
                .with_provider("openai")
                .with_model("gpt-3.5-turbo"),
        )
        .await;
    assert_eq!((resp.provider.as_str(), resp.model.as_str()), ("openai", "gpt-3.5-turbo"));
}

/// **Scenario**: The response envelope serializes with every field present.
#[tokio::test]
async fn response_serializes_all_fields() {
    let h = harness_with(
        llm_classifying("RAG"),
        MockQueryEngine::new(""),
        MockRetriever::new(["p"]),
    );
    let resp = h
        .executor
        .resolve(QueryRequest::new("What is GEO").with_thread("t9"))
        .await;
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["thread_id"], "t9");
    assert_eq!(json["intent"], "rag");
    assert!(json["sql_result"].is_null());
    assert!(json["error"].is_null());
}

#[cfg(feature = "sqlite")]
mod sqlite_stack {
    use std::sync::Arc;

    use biograph::{
        build_workflow_graph, CheckpointStore, Executor, InvocationState, MockRetriever,
        QueryRequest, SqliteCheckpointStore, SqliteQueryEngine, WorkflowOptions,
    };

    use crate::common::{registry_with, CLASSIFY, GENERATE_SQL};

    fn executor(dir: &std::path::Path, llm: Arc<biograph::MockLlm>) -> Executor {
        let engine = SqliteQueryEngine::new(dir.join("bio.db")).unwrap();
        let store: SqliteCheckpointStore<InvocationState> =
            SqliteCheckpointStore::new(dir.join("checkpoints.db")).unwrap();
        let graph = build_workflow_graph(
            Arc::new(engine),
            Arc::new(MockRetriever::new(["p"])),
            WorkflowOptions::default(),
        )
        .unwrap();
        Executor::new(graph, Arc::new(store), registry_with(llm))
    }

    /// **Scenario**: Fenced SQL from the model runs against the bootstrapped catalog,
    /// and the thread survives reopening the checkpoint database.
    #[tokio::test]
    async fn sqlite_catalog_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(
            biograph::MockLlm::new("unused")
                .when(CLASSIFY, "SQL")
                .when(
                    GENERATE_SQL,
                    "```sql\nSELECT accession, title FROM gse WHERE accession = 'GSE10000'\n```",
                ),
        );

        let resp = executor(dir.path(), llm.clone())
            .resolve(QueryRequest::new("Show GSE10000").with_thread("persist"))
            .await;
        assert!(resp.error.is_none(), "{:?}", resp.error);
        assert_eq!(
            resp.sql_result.as_deref(),
            Some(
                "Query: SELECT accession, title FROM gse WHERE accession = 'GSE10000'\n\n\
                 Result: [('GSE10000', 'Mouse liver expression')]"
            )
        );

        let reopened: SqliteCheckpointStore<InvocationState> =
            SqliteCheckpointStore::new(dir.path().join("checkpoints.db")).unwrap();
        let cp = reopened.get("persist").await.unwrap().expect("checkpoint");
        assert_eq!(cp.channel_values.query, "Show GSE10000");
        assert_eq!(reopened.list().await.unwrap(), vec!["persist"]);

        let again = executor(dir.path(), llm)
            .resolve(QueryRequest::new("Show GSE10000").with_thread("persist"))
            .await;
        assert!(again.error.is_none());
        let cp = reopened.get("persist").await.unwrap().unwrap();
        assert_eq!(cp.metadata.step, 2);
    }

    /// **Scenario**: Generated statements that write are rejected by the read-only connection.
    #[tokio::test]
    async fn write_statements_fail_as_section_text() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(
            biograph::MockLlm::new("unused")
                .when(CLASSIFY, "SQL")
                .when(GENERATE_SQL, "DELETE FROM gse"),
        );
        let ex = executor(dir.path(), llm);
        let resp = ex.resolve(QueryRequest::new("wipe it")).await;
        assert!(resp
            .sql_result
            .as_deref()
            .unwrap()
            .starts_with("Query: DELETE FROM gse\n\nError: query execution:"));

        let engine = SqliteQueryEngine::new(dir.path().join("bio.db")).unwrap();
        assert_eq!(engine.records().await.unwrap().len(), 2);
    }
}
