//! Effects produced by state transitions

use crate::llm::Citation;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a user message to the transcript
    AppendUserMessage { text: String },

    /// Append a model message to the transcript
    AppendModelMessage {
        text: String,
        citations: Vec<Citation>,
    },

    /// Record the session's last error
    RecordError { message: String },

    /// Clear any prior error
    ClearError,

    /// Publish the new state (pending flag) to subscribers
    PublishState,

    /// Notify subscribers that the request lifecycle finished
    NotifyDone,

    /// Dispatch a generation request (runs as a background task)
    RequestGeneration { prompt: String },
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendUserMessage { text: text.into() }
    }

    pub fn append_model(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Effect::AppendModelMessage {
            text: text.into(),
            citations,
        }
    }
}
