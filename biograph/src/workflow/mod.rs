//! The query workflow: the fixed routing graph and the executor that runs it per thread.

mod builder;
mod executor;

pub use builder::{build_workflow_graph, route_after_classification, route_after_structured, WorkflowOptions};
pub use executor::{Executor, QueryRequest, QueryResponse, Resolution, EMPTY_ANSWER, ERROR_INTENT};
