//! API request and response types

use crate::geo::LocationStatus;
use crate::state_machine::ChatMessage;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub queued: bool,
}

/// Response with the conversation snapshot
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub location: LocationStatus,
}

/// Response with the position tri-state
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    #[serde(flatten)]
    pub status: LocationStatus,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
