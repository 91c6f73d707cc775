//! StateGraph compile failure cases: missing entry, unknown node, branch mismatches,
//! duplicate or missing edges, unreachable nodes, cycles.

use std::sync::Arc;

use biograph::{
    build_workflow_graph, Branch, CompilationError, MockQueryEngine, MockRetriever, NodeId,
    StateGraph, WorkflowOptions, END,
};

use crate::common::{mark, Trail};

use NodeId::{Aggregator, Conversation, IntentClassifier, RetrievalResolver, StructuredResolver};

#[test]
fn compile_fails_without_entry() {
    let mut graph = StateGraph::<Trail>::new();
    graph.add_node(mark(IntentClassifier)).add_edge(IntentClassifier, END);
    assert_eq!(graph.compile().err(), Some(CompilationError::MissingEntry));
}

#[test]
fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .set_entry(IntentClassifier)
        .add_edge(IntentClassifier, Aggregator);

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, Aggregator),
        _ => panic!("expected NodeNotFound"),
    }
}

#[test]
fn compile_fails_when_entry_is_not_registered() {
    let mut graph = StateGraph::<Trail>::new();
    graph.add_node(mark(Aggregator)).add_edge(Aggregator, END).set_entry(IntentClassifier);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::NodeNotFound(IntentClassifier))
    );
}

/// **Scenario**: A key the router can return but the branch map lacks is rejected.
#[test]
fn compile_fails_when_declared_branch_has_no_target() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_conditional_edges(
            IntentClassifier,
            &[Branch::Sql, Branch::Chat],
            |_: &Trail| Branch::Sql,
            [(Branch::Sql, Aggregator)],
        )
        .add_edge(Aggregator, END);

    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::UndeclaredBranch {
            from: IntentClassifier,
            branch: Branch::Chat
        })
    );
}

/// **Scenario**: A branch map entry the router never declares is rejected.
#[test]
fn compile_fails_when_branch_is_not_declared_by_router() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_conditional_edges(
            IntentClassifier,
            &[Branch::Sql],
            |_: &Trail| Branch::Sql,
            [(Branch::Sql, Aggregator), (Branch::Rag, Aggregator)],
        )
        .add_edge(Aggregator, END);

    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::UnknownBranch {
            from: IntentClassifier,
            branch: Branch::Rag
        })
    );
}

#[test]
fn compile_fails_on_second_edge_from_same_node() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_edge(IntentClassifier, Aggregator)
        .add_edge(IntentClassifier, END)
        .add_edge(Aggregator, END);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::DuplicateEdge(IntentClassifier))
    );
}

#[test]
fn compile_fails_when_node_has_no_edge() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Aggregator))
        .set_entry(IntentClassifier)
        .add_edge(IntentClassifier, Aggregator);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::MissingEdge(Aggregator))
    );
}

#[test]
fn compile_fails_when_node_is_unreachable() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(Conversation))
        .set_entry(IntentClassifier)
        .add_edge(IntentClassifier, END)
        .add_edge(Conversation, END);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::Unreachable(Conversation))
    );
}

#[test]
fn compile_fails_on_cycle() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_node(mark(IntentClassifier))
        .add_node(mark(StructuredResolver))
        .add_node(mark(RetrievalResolver))
        .set_entry(IntentClassifier)
        .add_edge(IntentClassifier, StructuredResolver)
        .add_edge(StructuredResolver, RetrievalResolver)
        .add_edge(RetrievalResolver, StructuredResolver);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::Cycle(StructuredResolver))
    );
}

/// **Scenario**: The production routing table passes every check.
#[test]
fn workflow_graph_compiles() {
    let graph = build_workflow_graph(
        Arc::new(MockQueryEngine::new("rows")),
        Arc::new(MockRetriever::new(["p"])),
        WorkflowOptions::default(),
    );
    assert!(graph.is_ok());
}
