//! # biograph
//!
//! Answers natural-language questions about a biological-data catalog (GEO series such
//! as `GSE10000`) by routing each query through a small state graph:
//!
//! - **intent classifier** picks `sql`, `rag`, `both`, `unknown` or `chat`;
//! - **structured resolver** generates and runs SQL against the catalog;
//! - **retrieval resolver** answers from knowledge-base passages;
//! - **conversation** replies from the thread's message history;
//! - **aggregator** merges structured and retrieval answers.
//!
//! Each conversation thread keeps its state in a [`CheckpointStore`]; runs on the same
//! thread are serialized, runs on different threads are independent. Capability failures
//! (LLM, query engine, retriever) never escape a node: they become degraded text plus a
//! [`ContainedFailure`] record.
//!
//! ## Main modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, closed `NodeId` / `Branch` routing.
//! - [`nodes`]: the five stage nodes.
//! - [`workflow`]: `build_workflow_graph` and the [`Executor`].
//! - [`memory`]: checkpoints, in-memory and SQLite stores, per-thread locks.
//! - [`llm`]: `LlmClient`, `MockLlm`, `ChatOpenAI` (feature `openai`), provider registry.
//! - [`query`], [`retrieval`]: structured-query and passage-search capabilities.
//! - [`config`], [`setup`]: `Settings::from_env` and `build_executor`.
//!
//! ## Features
//!
//! - `openai` (default): OpenAI-compatible chat via `async-openai` (also used for Ollama).
//! - `sqlite` (default): SQLite catalog engine and persistent checkpoint store.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use biograph::{build_executor, QueryRequest, Settings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! let executor = build_executor(&settings)?;
//! let response = executor
//!     .resolve(QueryRequest::new("What is the title of GSE10000?"))
//!     .await;
//! println!("{} [{}]", response.answer, response.intent);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod nodes;
pub mod prompts;
pub mod query;
pub mod retrieval;
pub mod setup;
pub mod state;
pub mod workflow;

pub use config::{ConfigError, Settings};
pub use error::{AgentError, CapabilityError};
pub use graph::{
    Branch, CompilationError, CompiledStateGraph, ContainedFailure, FailureKind, GraphState,
    Node, NodeId, NodeOutput, RunContext, RunOutcome, StateGraph, Target, END,
};
pub use llm::{LlmClient, LlmResponse, LlmSelection, MockLlm, Provider, ProviderInfo, ProviderRegistry};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, CheckpointStore,
    JsonSerializer, MemoryCheckpointStore, Serializer, ThreadGuard, ThreadLocks,
};
pub use message::Message;
pub use nodes::{
    aggregate, AggregatorNode, ConversationNode, IntentClassifierNode, RetrievalResolverNode,
    StructuredResolverNode,
};
pub use query::{clean_sql, MockQueryEngine, QueryEngine};
pub use retrieval::{MockRetriever, PassageStore, Retriever};
pub use setup::{build_checkpoint_store, build_executor, build_registry, SetupError};
pub use state::{Intent, InvocationState, StateUpdate};
pub use workflow::{build_workflow_graph, Executor, QueryRequest, QueryResponse, Resolution, WorkflowOptions};

#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
#[cfg(feature = "sqlite")]
pub use memory::SqliteCheckpointStore;
#[cfg(feature = "sqlite")]
pub use query::{GseRecord, SqliteQueryEngine};
