//! Closed sets of node ids and routing keys.
//!
//! The workflow has a fixed node set, so nodes and decision keys are enums rather than
//! strings: an unknown id cannot be spelled, and the compiled routing table can be
//! checked exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::Intent;

/// Identifies one stage of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    IntentClassifier,
    StructuredResolver,
    RetrievalResolver,
    Conversation,
    Aggregator,
}

impl NodeId {
    pub const ALL: [NodeId; 5] = [
        NodeId::IntentClassifier,
        NodeId::StructuredResolver,
        NodeId::RetrievalResolver,
        NodeId::Conversation,
        NodeId::Aggregator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::IntentClassifier => "intent_classifier",
            NodeId::StructuredResolver => "structured_resolver",
            NodeId::RetrievalResolver => "retrieval_resolver",
            NodeId::Conversation => "conversation",
            NodeId::Aggregator => "aggregator",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision key returned by a conditional edge's router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Sql,
    Rag,
    Both,
    Unknown,
    Chat,
    /// After the structured stage: continue to retrieval.
    Retrieve,
    /// After the structured stage: go straight to aggregation.
    Aggregate,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Sql => "sql",
            Branch::Rag => "rag",
            Branch::Both => "both",
            Branch::Unknown => "unknown",
            Branch::Chat => "chat",
            Branch::Retrieve => "retrieve",
            Branch::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Intent> for Branch {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Sql => Branch::Sql,
            Intent::Rag => Branch::Rag,
            Intent::Both => Branch::Both,
            Intent::Unknown => Branch::Unknown,
            Intent::Chat => Branch::Chat,
        }
    }
}

/// Where an edge leads: another node or the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Node(NodeId),
    End,
}

/// Sentinel for graph exit: use as the target in `add_edge(last_node, END)`.
pub const END: Target = Target::End;

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(id) => id.fmt(f),
            Target::End => f.write_str("__end__"),
        }
    }
}
