//! Run context passed into nodes.
//!
//! Holds what varies per run rather than per graph: the thread being served and the
//! LLM client selected for this request.

use std::fmt;
use std::sync::Arc;

use crate::llm::LlmClient;

#[derive(Clone)]
pub struct RunContext {
    /// Thread the run belongs to; never changes within a run.
    pub thread_id: String,
    /// LLM selected for this run (after provider fallback).
    pub llm: Arc<dyn LlmClient>,
}

impl RunContext {
    pub fn new(thread_id: impl Into<String>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            thread_id: thread_id.into(),
            llm,
        }
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}
