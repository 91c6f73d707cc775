//! Stage nodes of the query workflow.
//!
//! Every node honors the same contract: capability failures become degraded text in the
//! state plus a `NodeOutput::Contained` record, never an `Err`.

mod aggregator;
mod conversation;
mod intent;
mod retrieval;
mod structured;

pub use aggregator::{aggregate, AggregatorNode, NO_INFORMATION, RAG_LABEL, SQL_LABEL};
pub use conversation::{cap_history, ConversationNode, DEFAULT_MAX_HISTORY_MESSAGES};
pub use intent::{normalize_intent, IntentClassifierNode};
pub use retrieval::{RetrievalResolverNode, DEFAULT_TOP_K};
pub use structured::StructuredResolverNode;
