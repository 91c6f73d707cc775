//! Routing per intent: visited nodes and the aggregated answer.

use biograph::{NodeId, QueryRequest};

use crate::common::harness;

use NodeId::{Aggregator, Conversation, IntentClassifier, RetrievalResolver, StructuredResolver};

/// **Scenario**: Each classifier label follows its row of the routing table.
#[tokio::test]
async fn path_per_intent() {
    let cases = [
        ("SQL", vec![IntentClassifier, StructuredResolver, Aggregator]),
        ("RAG", vec![IntentClassifier, RetrievalResolver, Aggregator]),
        (
            "BOTH",
            vec![IntentClassifier, StructuredResolver, RetrievalResolver, Aggregator],
        ),
        ("UNKNOWN", vec![IntentClassifier, RetrievalResolver, Aggregator]),
        ("CHAT", vec![IntentClassifier, Conversation]),
    ];
    for (label, expected) in cases {
        let h = harness(label);
        let res = h
            .executor
            .resolve_detailed(QueryRequest::new("question").with_thread("t"))
            .await;
        let outcome = res.outcome.expect("run succeeds");
        assert_eq!(outcome.path, expected, "label {}", label);
        assert!(outcome.failures.is_empty(), "label {}", label);
    }
}

/// **Scenario**: rag intent → only the knowledge-base section, SQL never executed.
#[tokio::test]
async fn rag_answer_has_single_section() {
    let h = harness("RAG");
    let resp = h.executor.resolve(QueryRequest::new("What is RNA-seq")).await;
    assert_eq!(resp.intent, "rag");
    assert_eq!(resp.rag_result.as_deref(), Some("rag reply"));
    assert!(resp.sql_result.is_none());
    assert_eq!(resp.answer, "Knowledge base result:\nrag reply");
    assert!(h.engine.executed().is_empty());
    assert_eq!(h.retriever.queries(), vec![("What is RNA-seq".to_string(), 4)]);
}

/// **Scenario**: both intent → SQL section first, then the knowledge-base section.
#[tokio::test]
async fn both_answer_has_two_sections_in_order() {
    let h = harness("BOTH");
    let resp = h
        .executor
        .resolve(QueryRequest::new("What did GSE10000 study"))
        .await;
    assert_eq!(resp.intent, "both");
    let sql = resp.sql_result.clone().expect("sql section");
    assert_eq!(sql, "Query: SELECT COUNT(*) FROM gse\n\nResult: [(2)]");
    assert_eq!(
        resp.answer,
        format!(
            "SQL database result:\n{}\n\nKnowledge base result:\nrag reply",
            sql
        )
    );
}

/// **Scenario**: An unmatched label is reported as unknown and answered from retrieval.
#[tokio::test]
async fn unknown_intent_answers_from_retrieval() {
    let h = harness("no idea");
    let resp = h.executor.resolve(QueryRequest::new("???")).await;
    assert_eq!(resp.intent, "unknown");
    assert!(resp.sql_result.is_none());
    assert_eq!(resp.answer, "Knowledge base result:\nrag reply");
    assert!(h.engine.executed().is_empty());
}

/// **Scenario**: chat intent → answer is the trimmed chat reply, no resolver output.
#[tokio::test]
async fn chat_answer_skips_aggregation() {
    let h = harness("CHAT");
    let resp = h.executor.resolve(QueryRequest::new("Hello")).await;
    assert_eq!(resp.intent, "chat");
    assert_eq!(resp.answer, "chat reply");
    assert!(resp.sql_result.is_none());
    assert!(resp.rag_result.is_none());
    assert!(h.engine.executed().is_empty());
}
