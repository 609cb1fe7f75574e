//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::geo::{Coordinates, LocationError, LocationProvider};
use crate::llm::Citation;
use crate::state_machine::{ChatMessage, Conversation, Role};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Storage for the conversation aggregate
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append a message; the store assigns the id and timestamp
    async fn append(
        &self,
        role: Role,
        text: &str,
        citations: Vec<Citation>,
    ) -> Result<ChatMessage, String>;

    /// Update the pending flag
    async fn set_pending(&self, pending: bool) -> Result<(), String>;

    /// Record the session's last error
    async fn record_error(&self, message: &str) -> Result<(), String>;

    /// Clear any recorded error
    async fn clear_error(&self) -> Result<(), String>;

    /// Snapshot the aggregate for rendering
    async fn snapshot(&self) -> Result<Conversation, String>;
}

/// One-shot source of the device position
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Attempt the session's single acquisition
    async fn acquire(&self) -> Result<Coordinates, LocationError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for Arc<T> {
    async fn append(
        &self,
        role: Role,
        text: &str,
        citations: Vec<Citation>,
    ) -> Result<ChatMessage, String> {
        (**self).append(role, text, citations).await
    }

    async fn set_pending(&self, pending: bool) -> Result<(), String> {
        (**self).set_pending(pending).await
    }

    async fn record_error(&self, message: &str) -> Result<(), String> {
        (**self).record_error(message).await
    }

    async fn clear_error(&self) -> Result<(), String> {
        (**self).clear_error().await
    }

    async fn snapshot(&self) -> Result<Conversation, String> {
        (**self).snapshot().await
    }
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Arc<T> {
    async fn acquire(&self) -> Result<Coordinates, LocationError> {
        (**self).acquire().await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// In-memory conversation store, seeded with the welcome message.
///
/// The runtime is the single writer; renders read snapshots. There is no
/// cross-session persistence — the transcript lives and dies with the
/// process.
pub struct SessionTranscript {
    inner: Mutex<Conversation>,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Conversation::new()),
        }
    }
}

impl Default for SessionTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for SessionTranscript {
    async fn append(
        &self,
        role: Role,
        text: &str,
        citations: Vec<Citation>,
    ) -> Result<ChatMessage, String> {
        let id = uuid::Uuid::new_v4().to_string();
        let message = match role {
            Role::User => ChatMessage::user(id, text),
            Role::Model => ChatMessage::model(id, text, citations),
        };

        self.inner.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn set_pending(&self, pending: bool) -> Result<(), String> {
        self.inner.lock().unwrap().pending = pending;
        Ok(())
    }

    async fn record_error(&self, message: &str) -> Result<(), String> {
        self.inner.lock().unwrap().last_error = Some(message.to_string());
        Ok(())
    }

    async fn clear_error(&self) -> Result<(), String> {
        self.inner.lock().unwrap().last_error = None;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Conversation, String> {
        Ok(self.inner.lock().unwrap().clone())
    }
}

#[async_trait]
impl LocationSource for LocationProvider {
    async fn acquire(&self) -> Result<Coordinates, LocationError> {
        LocationProvider::acquire(self).await
    }
}
