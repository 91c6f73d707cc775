//! Conversational resolver: replies from the thread's message history.

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{ContainedFailure, FailureKind, Node, NodeId, NodeOutput, RunContext};
use crate::message::Message;
use crate::prompts::CHAT_SYSTEM_PROMPT;
use crate::state::{InvocationState, StateUpdate};

/// 20 user/assistant turns.
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 40;

/// Drops the oldest messages so at most `max` remain. `max = 0` keeps everything.
pub fn cap_history(messages: &mut Vec<Message>, max: usize) {
    if max > 0 && messages.len() > max {
        let excess = messages.len() - max;
        messages.drain(..excess);
    }
}

/// Terminal node of the chat path. Owns the only writes to `messages`.
#[derive(Debug)]
pub struct ConversationNode {
    max_history: usize,
}

impl ConversationNode {
    pub fn new(max_history: usize) -> Self {
        Self { max_history }
    }
}

impl Default for ConversationNode {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_MESSAGES)
    }
}

#[async_trait]
impl Node<InvocationState> for ConversationNode {
    fn id(&self) -> NodeId {
        NodeId::Conversation
    }

    async fn run(
        &self,
        state: &InvocationState,
        ctx: &RunContext,
    ) -> Result<NodeOutput<StateUpdate>, AgentError> {
        let mut history = state.messages.clone();
        let last_user = history.iter().rev().find_map(|m| match m {
            Message::User(content) => Some(content.as_str()),
            _ => None,
        });
        // Replay guard: a resubmitted query is not recorded twice.
        if last_user != Some(state.query.as_str()) {
            history.push(Message::user(state.query.clone()));
        }

        let mut request = Vec::with_capacity(history.len() + 1);
        request.push(Message::system(CHAT_SYSTEM_PROMPT));
        request.extend(history.iter().cloned());
        debug!(thread_id = %ctx.thread_id, history = history.len(), "chat request");

        match ctx.llm.invoke(&request).await {
            Ok(response) => {
                let answer = response.content.trim().to_string();
                history.push(Message::assistant(answer.clone()));
                cap_history(&mut history, self.max_history);
                Ok(NodeOutput::Updated(
                    StateUpdate::answer(answer).with_messages(history),
                ))
            }
            Err(e) => {
                cap_history(&mut history, self.max_history);
                Ok(NodeOutput::Contained {
                    update: StateUpdate::answer(format!(
                        "Sorry, an error occurred while handling your message: {}",
                        e
                    ))
                    .with_messages(history),
                    failure: ContainedFailure::new(
                        NodeId::Conversation,
                        FailureKind::Conversation,
                        e.to_string(),
                    ),
                })
            }
        }
    }
}
