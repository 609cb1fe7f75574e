//! Runtime for executing the chat session
//!
//! The runtime is the impure shell around the pure state machine: it owns
//! the conversation aggregate, executes effects, dispatches the one-shot
//! position acquisition, and broadcasts updates to subscribers.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::geo::LocationStatus;
use crate::llm::GroundedClient;
use crate::state_machine::{ChatMessage, ChatState, Conversation, Event};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Type alias for the production runtime with concrete implementations
pub type ProductionRuntime =
    SessionRuntime<Arc<SessionTranscript>, Arc<dyn GroundedClient>, Arc<dyn LocationSource>>;

/// Events sent to SSE subscribers
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// Full snapshot sent once per subscription
    Init {
        conversation: Conversation,
        location: LocationStatus,
    },
    /// A message was appended to the transcript
    Message { message: ChatMessage },
    /// The request lifecycle state changed
    StateChange { state: ChatState },
    /// The one-shot position acquisition reached its terminal outcome
    Location { status: LocationStatus },
    /// The in-flight request resolved (success or failure)
    Done,
    /// A user-facing error (e.g. a rejected submission)
    Error { message: String },
}

/// Owns the single chat session: its channels plus snapshot access.
pub struct SessionManager {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    transcript: Arc<SessionTranscript>,
    location: Arc<RwLock<LocationStatus>>,
}

impl SessionManager {
    /// Start the session runtime and return a handle to it.
    pub fn start(client: Arc<dyn GroundedClient>, location_source: Arc<dyn LocationSource>) -> Self {
        let transcript = Arc::new(SessionTranscript::new());
        let location = Arc::new(RwLock::new(LocationStatus::Acquiring));
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime: ProductionRuntime = SessionRuntime::new(
            ChatState::Idle,
            transcript.clone(),
            client,
            location_source,
            location.clone(),
            event_rx,
            event_tx.clone(),
            broadcast_tx.clone(),
        );

        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!("Session runtime finished");
        });

        Self {
            event_tx,
            broadcast_tx,
            transcript,
            location,
        }
    }

    /// Submit user text to the session.
    ///
    /// Acceptance is asynchronous: a submission while a request is in
    /// flight is rejected by the state machine and surfaced on the event
    /// stream, leaving the transcript untouched.
    pub async fn submit(&self, text: String) -> Result<(), String> {
        self.event_tx
            .send(Event::Submit { text })
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// Subscribe to session updates
    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Snapshot of the conversation aggregate
    pub async fn conversation(&self) -> Conversation {
        self.transcript
            .snapshot()
            .await
            .unwrap_or_else(|_| Conversation::new())
    }

    /// Current position tri-state
    pub async fn location(&self) -> LocationStatus {
        self.location.read().await.clone()
    }
}
