//! Shared test types for state_graph tests.

use std::sync::Arc;

use async_trait::async_trait;
use biograph::{AgentError, GraphState, MockLlm, Node, NodeId, NodeOutput, RunContext};

/// Records which nodes ran, in order.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    pub visited: Vec<NodeId>,
    pub go_left: bool,
}

impl GraphState for Trail {
    type Update = NodeId;

    fn apply(&mut self, update: NodeId) {
        self.visited.push(update);
    }
}

/// Node that only records itself.
pub struct Mark(pub NodeId);

#[async_trait]
impl Node<Trail> for Mark {
    fn id(&self) -> NodeId {
        self.0
    }

    async fn run(&self, _state: &Trail, _ctx: &RunContext) -> Result<NodeOutput<NodeId>, AgentError> {
        Ok(NodeOutput::Updated(self.0))
    }
}

pub fn mark(id: NodeId) -> Arc<dyn Node<Trail>> {
    Arc::new(Mark(id))
}

pub fn ctx() -> RunContext {
    RunContext::new("thread-1", Arc::new(MockLlm::new("")))
}
