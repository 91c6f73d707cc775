//! Invoke: linear chains, conditional routing, run-time routing errors.

use biograph::{AgentError, Branch, NodeId, StateGraph, END};

use crate::common::{ctx, mark, Trail};

use NodeId::{Aggregator, IntentClassifier, RetrievalResolver, StructuredResolver};

fn diamond() -> StateGraph<Trail> {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(StructuredResolver))
        .add_node(mark(RetrievalResolver))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_conditional_edges(
            IntentClassifier,
            &[Branch::Sql, Branch::Rag],
            |s: &Trail| if s.go_left { Branch::Sql } else { Branch::Rag },
            [(Branch::Sql, StructuredResolver), (Branch::Rag, RetrievalResolver)],
        )
        .add_edge(StructuredResolver, Aggregator)
        .add_edge(RetrievalResolver, Aggregator)
        .add_edge(Aggregator, END);
    graph
}

/// **Scenario**: The router's key picks the branch; both branches rejoin at the aggregator.
#[tokio::test]
async fn conditional_edges_follow_router() {
    let compiled = diamond().compile().unwrap();

    let left = compiled
        .invoke(Trail { go_left: true, ..Default::default() }, &ctx())
        .await
        .unwrap();
    assert_eq!(left.path, vec![IntentClassifier, StructuredResolver, Aggregator]);
    assert_eq!(left.state.visited, left.path);

    let right = compiled.invoke(Trail::default(), &ctx()).await.unwrap();
    assert_eq!(right.path, vec![IntentClassifier, RetrievalResolver, Aggregator]);
    assert!(right.failures.is_empty());
}

/// **Scenario**: A router returning a key it never declared fails the run with UnroutedBranch.
#[tokio::test]
async fn undeclared_key_at_run_time_is_unrouted_branch() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_conditional_edges(
            IntentClassifier,
            &[Branch::Sql],
            |_: &Trail| Branch::Chat,
            [(Branch::Sql, Aggregator)],
        )
        .add_edge(Aggregator, END);
    let compiled = graph.compile().unwrap();

    match compiled.invoke(Trail::default(), &ctx()).await {
        Err(AgentError::UnroutedBranch { from, branch }) => {
            assert_eq!(from, IntentClassifier);
            assert_eq!(branch, Branch::Chat);
        }
        other => panic!("expected UnroutedBranch, got {:?}", other.map(|o| o.path)),
    }
}
