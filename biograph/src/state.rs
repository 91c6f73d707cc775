//! Invocation state threaded through the query workflow.
//!
//! One `InvocationState` flows through every node of a run; nodes return a
//! `StateUpdate` (partial state) which the graph runner applies with
//! [`GraphState::apply`](crate::graph::GraphState::apply).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::GraphState;
use crate::message::Message;

/// Classified category of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Structured data from the catalog database.
    Sql,
    /// Knowledge-base retrieval.
    Rag,
    /// Structured lookup followed by retrieval.
    Both,
    /// Classification did not match any label; answered from retrieval.
    Unknown,
    /// Small talk unrelated to the catalog.
    Chat,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Sql,
        Intent::Rag,
        Intent::Both,
        Intent::Unknown,
        Intent::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Sql => "sql",
            Intent::Rag => "rag",
            Intent::Both => "both",
            Intent::Unknown => "unknown",
            Intent::Chat => "chat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record threaded through one run of the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationState {
    pub query: String,
    pub intent: Option<Intent>,
    pub sql_answer: Option<String>,
    pub rag_answer: Option<String>,
    pub answer: Option<String>,
    pub model_provider: String,
    pub model_name: String,
    pub thread_id: String,
    /// Conversation history; only the conversational path reads or extends it.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl InvocationState {
    /// Fresh state for a run. `messages` carries the thread's prior history.
    pub fn new(
        query: impl Into<String>,
        thread_id: impl Into<String>,
        model_provider: impl Into<String>,
        model_name: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            query: query.into(),
            thread_id: thread_id.into(),
            model_provider: model_provider.into(),
            model_name: model_name.into(),
            messages,
            ..Default::default()
        }
    }
}

/// Partial state produced by a node. `None` fields leave the state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub intent: Option<Intent>,
    pub sql_answer: Option<String>,
    pub rag_answer: Option<String>,
    pub answer: Option<String>,
    pub messages: Option<Vec<Message>>,
}

impl StateUpdate {
    pub fn intent(intent: Intent) -> Self {
        Self {
            intent: Some(intent),
            ..Default::default()
        }
    }

    pub fn sql_answer(text: impl Into<String>) -> Self {
        Self {
            sql_answer: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn rag_answer(text: impl Into<String>) -> Self {
        Self {
            rag_answer: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }
}

impl GraphState for InvocationState {
    type Update = StateUpdate;

    fn apply(&mut self, update: StateUpdate) {
        if let Some(intent) = update.intent {
            self.intent = Some(intent);
        }
        if let Some(sql) = update.sql_answer {
            self.sql_answer = Some(sql);
        }
        if let Some(rag) = update.rag_answer {
            self.rag_answer = Some(rag);
        }
        if let Some(answer) = update.answer {
            self.answer = Some(answer);
        }
        if let Some(messages) = update.messages {
            self.messages = messages;
        }
    }
}
