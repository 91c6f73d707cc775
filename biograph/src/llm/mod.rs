//! LLM client abstraction used by every stage that talks to a model.
//!
//! Defines the `LlmClient` trait, a mock implementation for tests and offline runs,
//! the OpenAI-compatible client (feature `openai`), and the provider registry that
//! picks a client per request and falls back to the default provider.

mod mock;
mod registry;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;
pub use registry::{LlmSelection, Provider, ProviderInfo, ProviderRegistry};

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::message::Message;

/// Response from an LLM completion.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; stage nodes read `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
}

/// LLM client: given messages, returns the assistant text.
///
/// Implementations: `MockLlm` (fixed or scripted replies), `ChatOpenAI` (real API,
/// feature `openai`). Timeouts, if any, belong to the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn over a full message sequence.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, CapabilityError>;

    /// Single-prompt convenience: sends `prompt` as one user message and returns the text.
    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        let response = self.invoke(&[Message::user(prompt)]).await?;
        Ok(response.content)
    }
}
