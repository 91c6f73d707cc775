//! Stand-in retriever for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::retrieval::Retriever;

/// Returns fixed passages (truncated to `k`) or fails; records every query.
pub struct MockRetriever {
    passages: Result<Vec<String>, String>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockRetriever {
    pub fn new<I, T>(passages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            passages: Ok(passages.into_iter().map(Into::into).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            passages: Err(message.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `(query, k)` of every search so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, CapabilityError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.to_string(), k));
        }
        match &self.passages {
            Ok(p) => Ok(p.iter().take(k).cloned().collect()),
            Err(msg) => Err(CapabilityError::Retrieval(msg.clone())),
        }
    }
}
