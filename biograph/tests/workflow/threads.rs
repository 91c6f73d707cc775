//! Thread continuity, isolation and lifecycle through the executor.

use biograph::{
    CheckpointError, CheckpointSource, CheckpointStore, Message, MockQueryEngine, MockRetriever,
    QueryRequest,
};

use crate::common::{harness, harness_with, llm_classifying, CLASSIFY};

/// **Scenario**: A second chat turn on the same thread sees the first turn's messages.
#[tokio::test]
async fn chat_history_carries_across_runs() {
    let h = harness("CHAT");
    h.executor
        .resolve(QueryRequest::new("My name is Alice").with_thread("t1"))
        .await;
    h.executor
        .resolve(QueryRequest::new("What is my name?").with_thread("t1"))
        .await;

    let calls = h.llm.calls();
    let second_chat = calls.last().expect("chat call");
    assert_eq!(
        &second_chat[1..],
        &[
            Message::user("My name is Alice"),
            Message::assistant("chat reply"),
            Message::user("What is my name?"),
        ]
    );

    let cp = h.store.get("t1").await.unwrap().expect("checkpoint");
    assert_eq!(cp.channel_values.messages.len(), 4);
    assert_eq!(cp.metadata.source, CheckpointSource::Loop);
    assert_eq!(cp.metadata.step, 2);
}

/// **Scenario**: Different thread ids never share history.
#[tokio::test]
async fn threads_are_isolated() {
    let h = harness("CHAT");
    h.executor
        .resolve(QueryRequest::new("secret").with_thread("a"))
        .await;
    h.executor
        .resolve(QueryRequest::new("hello").with_thread("b"))
        .await;

    let b = h.store.get("b").await.unwrap().unwrap();
    assert_eq!(
        b.channel_values.messages,
        vec![Message::user("hello"), Message::assistant("chat reply")]
    );
    assert_eq!(b.metadata.source, CheckpointSource::Input);
    assert_eq!(h.executor.list_threads().await.unwrap(), vec!["a", "b"]);
}

/// **Scenario**: Per-run fields do not leak into the next run on the same thread.
#[tokio::test]
async fn only_messages_carry_over() {
    let h = harness("SQL");
    h.executor
        .resolve(QueryRequest::new("How many records?").with_thread("t1"))
        .await;
    let first = h.store.get("t1").await.unwrap().unwrap();
    assert!(first.channel_values.sql_answer.is_some());
    assert!(first.channel_values.messages.is_empty());

    let res = h
        .executor
        .resolve_detailed(QueryRequest::new("again").with_thread("t1"))
        .await;
    let state = res.outcome.unwrap().state;
    assert_eq!(state.query, "again");
    assert_eq!(state.thread_id, "t1");
}

/// **Scenario**: Deleting twice → the second delete reports NotFound; the id then starts fresh.
#[tokio::test]
async fn delete_is_not_found_the_second_time() {
    let h = harness("CHAT");
    h.executor
        .resolve(QueryRequest::new("hi").with_thread("gone"))
        .await;

    h.executor.delete_thread("gone").await.unwrap();
    match h.executor.delete_thread("gone").await {
        Err(CheckpointError::NotFound(id)) => assert_eq!(id, "gone"),
        other => panic!("expected NotFound, got {:?}", other),
    }

    h.executor
        .resolve(QueryRequest::new("hi again").with_thread("gone"))
        .await;
    let cp = h.store.get("gone").await.unwrap().unwrap();
    assert_eq!(cp.channel_values.messages.len(), 2);
    assert_eq!(cp.metadata.step, 1);
}

/// **Scenario**: clear removes every thread and reports the count.
#[tokio::test]
async fn clear_reports_count() {
    let h = harness("RAG");
    for t in ["x", "y", "z"] {
        h.executor
            .resolve(QueryRequest::new("q").with_thread(t))
            .await;
    }
    assert_eq!(h.executor.clear_threads().await.unwrap(), 3);
    assert!(h.executor.list_threads().await.unwrap().is_empty());
    assert_eq!(h.executor.clear_threads().await.unwrap(), 0);
}

/// **Scenario**: Two concurrent runs on one thread serialize; neither turn is lost.
///
/// The LLM yields before every reply, so without the thread lock the second run would
/// load the empty thread while the first is still in the graph.
#[tokio::test]
async fn concurrent_runs_on_same_thread_keep_both_turns() {
    let h = harness_with(
        llm_classifying("CHAT").yielding(),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::new(["p"]),
    );
    let (a, b) = tokio::join!(
        h.executor.resolve(QueryRequest::new("first").with_thread("c")),
        h.executor.resolve(QueryRequest::new("second").with_thread("c")),
    );
    assert!(!a.is_error() && !b.is_error());

    let cp = h.store.get("c").await.unwrap().unwrap();
    let messages = cp.channel_values.messages;
    assert_eq!(messages.len(), 4);
    let users: Vec<&str> = messages
        .iter()
        .filter(|m| matches!(m, Message::User(_)))
        .map(Message::content)
        .collect();
    assert_eq!(users, vec!["first", "second"]);
    assert_eq!(cp.metadata.step, 2);

    // The second chat call already saw the first turn.
    let calls = h.llm.calls();
    let last_chat = calls.last().expect("chat call");
    assert_eq!(
        &last_chat[1..],
        &[
            Message::user("first"),
            Message::assistant("chat reply"),
            Message::user("second"),
        ]
    );
}

/// **Scenario**: Concurrent runs on distinct threads still interleave.
#[tokio::test]
async fn concurrent_runs_on_distinct_threads_interleave() {
    let h = harness_with(
        llm_classifying("CHAT").yielding(),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::new(["p"]),
    );
    let (a, b) = tokio::join!(
        h.executor.resolve(QueryRequest::new("first").with_thread("d1")),
        h.executor.resolve(QueryRequest::new("second").with_thread("d2")),
    );
    assert!(!a.is_error() && !b.is_error());

    // Both classifications run before either chat call.
    let calls = h.llm.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].last().unwrap().content().contains(CLASSIFY));
    assert!(calls[1].last().unwrap().content().contains(CLASSIFY));
}

/// **Scenario**: Lock entries do not accumulate across many threads, deletes and clears.
#[tokio::test]
async fn thread_locks_do_not_accumulate() {
    let h = harness("CHAT");
    for i in 0..20 {
        h.executor
            .resolve(QueryRequest::new("hi").with_thread(format!("t{i}")))
            .await;
    }
    assert_eq!(h.store.active_locks(), 0);

    for i in 0..10 {
        h.executor.delete_thread(&format!("t{i}")).await.unwrap();
    }
    assert_eq!(h.store.active_locks(), 0);

    assert_eq!(h.executor.clear_threads().await.unwrap(), 10);
    for i in 0..5 {
        h.executor
            .resolve(QueryRequest::new("  ").with_thread(format!("e{i}")))
            .await;
    }
    assert!(matches!(
        h.executor.delete_thread("missing").await,
        Err(CheckpointError::NotFound(_))
    ));
    assert_eq!(h.store.active_locks(), 0);
}
