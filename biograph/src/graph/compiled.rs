//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Holds the nodes, the entry and the validated edge
//! table. Each run is one sequential pass from the entry to an `END` target; nodes run
//! at most once because the graph is acyclic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AgentError;

use super::logging::{
    log_contained_failure, log_graph_complete, log_graph_error, log_graph_start,
    log_node_complete, log_node_start,
};
use super::node::{ContainedFailure, GraphState, Node, NodeOutput};
use super::state_graph::Edge;
use super::{NodeId, RunContext, Target};

/// Final state of a run plus what happened along the way.
#[derive(Debug, Clone)]
pub struct RunOutcome<S> {
    pub state: S,
    /// Nodes in the order they ran.
    pub path: Vec<NodeId>,
    /// Failures nodes contained, in the order they happened.
    pub failures: Vec<ContainedFailure>,
}

/// Compiled graph: immutable structure, supports invoke only.
///
/// Created by `StateGraph::compile()`. Starts at the entry node; after each node the
/// edge table decides the next node or the end of the run.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<NodeId, Arc<dyn Node<S>>>,
    pub(super) entry: NodeId,
    pub(super) edges: HashMap<NodeId, Edge<S>>,
}

impl<S> Clone for CompiledStateGraph<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            entry: self.entry,
            edges: self.edges.clone(),
        }
    }
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Looks up where to go after `from`, given the state after `from` ran.
    pub fn next_target(&self, from: NodeId, state: &S) -> Result<Target, AgentError> {
        let edge = self
            .edges
            .get(&from)
            .ok_or_else(|| AgentError::ExecutionFailed(format!("no edge from {}", from)))?;
        match edge {
            Edge::Direct(target) => Ok(*target),
            Edge::Conditional { router, branches } => {
                let branch = (router.route)(state);
                branches
                    .get(&branch)
                    .copied()
                    .ok_or(AgentError::UnroutedBranch { from, branch })
            }
        }
    }

    /// Runs the graph once from the entry node.
    ///
    /// A node's `Err` aborts the run and is returned as is; `NodeOutput::Contained`
    /// is applied like a normal update and recorded in `RunOutcome::failures`.
    pub async fn invoke(&self, state: S, ctx: &RunContext) -> Result<RunOutcome<S>, AgentError> {
        let mut state = state;
        let mut path = Vec::new();
        let mut failures = Vec::new();
        let mut current = self.entry;

        log_graph_start(current);
        loop {
            let node = self.nodes.get(&current).ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node {} not registered", current))
            })?;

            log_node_start(current);
            let output = match node.run(&state, ctx).await {
                Ok(output) => output,
                Err(e) => {
                    log_graph_error(current, &e);
                    return Err(e);
                }
            };
            path.push(current);

            match output {
                NodeOutput::Updated(update) => state.apply(update),
                NodeOutput::Contained { update, failure } => {
                    log_contained_failure(&failure);
                    failures.push(failure);
                    state.apply(update);
                }
            }

            let next = match self.next_target(current, &state) {
                Ok(next) => next,
                Err(e) => {
                    log_graph_error(current, &e);
                    return Err(e);
                }
            };
            log_node_complete(current, &next);

            match next {
                Target::End => break,
                Target::Node(id) => current = id,
            }
        }
        log_graph_complete(&path);

        Ok(RunOutcome {
            state,
            path,
            failures,
        })
    }
}
