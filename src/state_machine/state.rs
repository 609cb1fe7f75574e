//! Conversation state types

use crate::llm::Citation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id of the seeded greeting; never produced by the id generator.
pub const WELCOME_MESSAGE_ID: &str = "welcome";

const WELCOME_TEXT: &str = "Hello! Ask me about nearby places or any other question. \
     I can use Google Search and Maps to find up-to-date information.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

/// A single transcript entry, immutable after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            citations: vec![],
            created_at: Utc::now(),
        }
    }

    pub fn model(id: impl Into<String>, text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            id: id.into(),
            role: Role::Model,
            text: text.into(),
            citations,
            created_at: Utc::now(),
        }
    }

    /// The synthetic greeting every transcript starts with
    pub fn welcome() -> Self {
        Self::model(WELCOME_MESSAGE_ID, WELCOME_TEXT, vec![])
    }
}

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for user input, no request in flight
    #[default]
    Idle,

    /// A generation request is in flight; submissions are rejected
    Awaiting,
}

impl ChatState {
    /// True strictly between request dispatch and its resolution
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatState::Awaiting)
    }
}

/// The ordered transcript plus its transient request bookkeeping.
///
/// Sole mutable aggregate of the session; only the runtime writes to it, in
/// response to state transitions, and mutation is append-only.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Conversation {
    /// A fresh transcript, seeded with the welcome message
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
            pending: false,
            last_error: None,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
