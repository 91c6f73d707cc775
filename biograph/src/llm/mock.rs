//! Mock LLM for tests and offline runs.
//!
//! Returns a fixed reply, a reply chosen by a substring rule on the last message, or
//! the next entry of a script. Every call's message list is recorded so tests can
//! inspect what a node actually sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

type Reply = Result<String, String>;

/// Mock LLM: fixed, rule-based or scripted replies.
///
/// Resolution order per call: next scripted reply, then the first rule whose needle
/// appears in the last message, then the default reply.
///
/// **Interaction**: Implements `LlmClient`; stands in for `ChatOpenAI` in tests and
/// when `Settings::use_mock_llm` is set.
pub struct MockLlm {
    default: Reply,
    rules: Vec<(String, Reply)>,
    script: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<Message>>>,
    yielding: bool,
}

impl MockLlm {
    /// Build a mock that always answers `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            default: Ok(content.into()),
            rules: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            yielding: false,
        }
    }

    /// Build a mock whose every call fails with `CapabilityError::Llm(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default: Err(message.into()),
            ..Self::new("")
        }
    }

    /// Build a mock that answers from `replies` in order, then falls back to the default.
    pub fn scripted<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mock = Self::new("");
        let script = replies.into_iter().map(|r| Ok(r.into())).collect();
        Self {
            script: Mutex::new(script),
            ..mock
        }
    }

    /// Answer `reply` whenever the last message contains `needle` (builder).
    pub fn when(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(reply.into())));
        self
    }

    /// Fail whenever the last message contains `needle` (builder).
    pub fn fail_when(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Err(message.into())));
        self
    }

    /// Set the default reply (builder).
    pub fn with_default(mut self, content: impl Into<String>) -> Self {
        self.default = Ok(content.into());
        self
    }

    /// Yield to the scheduler before every reply so concurrent runs interleave (builder).
    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    /// Messages received by each call so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn pick(&self, messages: &[Message]) -> Reply {
        if let Ok(mut script) = self.script.lock() {
            if let Some(reply) = script.pop_front() {
                return reply;
            }
        }
        let last = messages.last().map(Message::content).unwrap_or_default();
        self.rules
            .iter()
            .find(|(needle, _)| last.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, CapabilityError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if self.yielding {
            tokio::task::yield_now().await;
        }
        self.pick(messages)
            .map(|content| LlmResponse { content })
            .map_err(CapabilityError::Llm)
    }
}
