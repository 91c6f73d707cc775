//! Retrieval capability: similarity search over knowledge-base passages.

mod mock;
mod passage_store;

pub use mock::MockRetriever;
pub use passage_store::{PassageStore, SEED_PASSAGES};

use async_trait::async_trait;

use crate::error::CapabilityError;

/// Knowledge-base search.
///
/// **Interaction**: Held by `RetrievalResolverNode` as `Arc<dyn Retriever>`; how passages
/// are embedded or indexed is up to the implementation.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` passages most relevant to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, CapabilityError>;
}
