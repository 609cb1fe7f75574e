//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::{LocationSource, SessionTranscript, TranscriptStore};
use super::{SessionRuntime, SseEvent};
use crate::geo::{Coordinates, LocationError, LocationStatus};
use crate::llm::{GroundedClient, GroundedRequest, GroundedResponse, LlmError};
use crate::state_machine::{ChatMessage, ChatState, Event};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Notify, RwLock};

// ============================================================================
// Mock Grounded Client
// ============================================================================

/// Mock client that returns queued responses and records every request
pub struct MockGroundedClient {
    responses: Mutex<VecDeque<Result<GroundedResponse, LlmError>>>,
    /// Record of all requests made, including their coordinate snapshots
    pub requests: Mutex<Vec<GroundedRequest>>,
}

impl MockGroundedClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: GroundedResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<GroundedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGroundedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroundedClient for MockGroundedClient {
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "test-model"
    }
}

/// Mock client with a configurable delay (for in-flight rejection tests)
pub struct DelayedMockGroundedClient {
    inner: MockGroundedClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockGroundedClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGroundedClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: GroundedResponse) {
        self.inner.queue_response(response);
    }
}

#[async_trait]
impl GroundedClient for DelayedMockGroundedClient {
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "test-model"
    }
}

// ============================================================================
// Mock Location Source
// ============================================================================

/// Mock position source with a fixed terminal outcome
pub struct MockLocationSource {
    outcome: Result<Coordinates, LocationError>,
}

impl MockLocationSource {
    pub fn fixed(coordinates: Coordinates) -> Self {
        Self {
            outcome: Ok(coordinates),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl LocationSource for MockLocationSource {
    async fn acquire(&self) -> Result<Coordinates, LocationError> {
        self.outcome.clone()
    }
}

// ============================================================================
// Test Runtime Builder
// ============================================================================

/// Helper for building test runtimes with minimal boilerplate
pub struct TestRuntime<C: GroundedClient + 'static> {
    pub transcript: Arc<SessionTranscript>,
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_rx: broadcast::Receiver<SseEvent>,
    pub client: Arc<C>,
    _runtime_handle: tokio::task::JoinHandle<()>,
}

impl<C: GroundedClient + 'static> TestRuntime<C> {
    pub fn with_client_and_location(client: C, location_source: MockLocationSource) -> Self {
        let transcript = Arc::new(SessionTranscript::new());
        let location = Arc::new(RwLock::new(LocationStatus::Acquiring));
        let client = Arc::new(client);
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, broadcast_rx) = broadcast::channel(128);

        let runtime = SessionRuntime::new(
            ChatState::Idle,
            transcript.clone(),
            client.clone(),
            location_source,
            location,
            event_rx,
            event_tx.clone(),
            broadcast_tx,
        );

        let handle = tokio::spawn(async move {
            runtime.run().await;
        });

        TestRuntime {
            transcript,
            event_tx,
            broadcast_rx,
            client,
            _runtime_handle: handle,
        }
    }

    /// Submit user text to the runtime
    pub async fn send_text(&self, text: &str) {
        self.event_tx
            .send(Event::Submit {
                text: text.to_string(),
            })
            .await
            .expect("Failed to send event");
    }

    /// Wait for the location acquisition outcome to be broadcast
    pub async fn wait_for_location(&mut self, timeout: Duration) -> Option<LocationStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.broadcast_rx.recv()).await {
                Ok(Ok(SseEvent::Location { status })) => return Some(status),
                Ok(Ok(_)) => continue,
                _ => continue,
            }
        }
        None
    }

    /// Wait for a Done event with timeout
    pub async fn wait_for_done(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.broadcast_rx.recv()).await {
                Ok(Ok(SseEvent::Done)) => return true,
                Ok(Ok(_)) => continue,
                _ => continue,
            }
        }
        false
    }

    /// Wait for a user-facing error broadcast with timeout
    pub async fn wait_for_error(&mut self, timeout: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.broadcast_rx.recv()).await {
                Ok(Ok(SseEvent::Error { message })) => return Some(message),
                Ok(Ok(_)) => continue,
                _ => continue,
            }
        }
        None
    }

    /// Get all messages from the transcript
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.snapshot().await.unwrap().messages
    }
}

impl TestRuntime<MockGroundedClient> {
    /// A runtime with instant mocks and an immediately-failing position source
    pub fn new() -> Self {
        Self::with_client_and_location(
            MockGroundedClient::new(),
            MockLocationSource::failing(LocationError::unsupported(
                "Geolocation is not supported in this environment.",
            )),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Citation, LlmErrorKind, REQUEST_FAILURE_MESSAGE};
    use crate::state_machine::state::WELCOME_MESSAGE_ID;
    use crate::state_machine::Role;

    #[tokio::test]
    async fn mock_client_pops_queued_responses() {
        let mock = MockGroundedClient::new();
        mock.queue_response(GroundedResponse::text_only("Hello"));

        let request = GroundedRequest::new("Hi", None);
        let response = mock.generate(&request).await.unwrap();
        assert_eq!(response.text, "Hello");

        // Second call has nothing queued and fails.
        let result = mock.generate(&request).await;
        assert_eq!(result.unwrap_err().kind, LlmErrorKind::Network);
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// End-to-end: seeded transcript, located submit, grounded reply.
    #[tokio::test]
    async fn grounded_reply_with_coordinates() {
        let coords = Coordinates::new(37.7749, -122.4194);
        let client = MockGroundedClient::new();
        client.queue_response(GroundedResponse {
            text: "Found 3 cafes".to_string(),
            citations: vec![Citation::web("http://x", Some("Cafe List".to_string()))],
        });

        let mut rt =
            TestRuntime::with_client_and_location(client, MockLocationSource::fixed(coords));

        // Seed only.
        assert_eq!(rt.messages().await.len(), 1);

        // Wait for the fix so the submit snapshots it.
        let status = rt.wait_for_location(Duration::from_secs(2)).await.unwrap();
        assert_eq!(status.coordinates(), Some(coords));

        rt.send_text("What's nearby?").await;
        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let msgs = rt.messages().await;
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0].id, WELCOME_MESSAGE_ID);
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].text, "What's nearby?");
        assert_eq!(msgs[2].role, Role::Model);
        assert_eq!(msgs[2].text, "Found 3 cafes");
        assert_eq!(
            msgs[2].citations,
            vec![Citation::web("http://x", Some("Cafe List".to_string()))]
        );

        // The dispatched request carried those exact coordinates.
        let requests = rt.client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "What's nearby?");
        assert_eq!(requests[0].coordinates, Some(coords));
    }

    /// A failed acquisition is non-fatal: the request goes out with no
    /// retrieval bias and the conversation proceeds.
    #[tokio::test]
    async fn failed_location_means_unbiased_request() {
        let client = MockGroundedClient::new();
        client.queue_response(GroundedResponse::text_only("An answer"));

        let mut rt = TestRuntime::with_client_and_location(
            client,
            MockLocationSource::failing(LocationError::permission_denied(
                "Error getting location: permission denied by position source",
            )),
        );

        let status = rt.wait_for_location(Duration::from_secs(2)).await.unwrap();
        assert!(status.coordinates().is_none());

        rt.send_text("Anything?").await;
        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let requests = rt.client.recorded_requests();
        assert_eq!(requests[0].coordinates, None);
        assert_eq!(rt.messages().await.len(), 3);
    }

    /// Submitting while a request is in flight is a no-op on the transcript.
    #[tokio::test]
    async fn submit_while_awaiting_is_rejected() {
        let client = DelayedMockGroundedClient::new(Duration::from_millis(200));
        client.queue_response(GroundedResponse::text_only("slow answer"));
        let request_started = client.request_started.clone();

        let mut rt = TestRuntime::with_client_and_location(
            client,
            MockLocationSource::failing(LocationError::unsupported("unsupported")),
        );

        rt.send_text("first").await;
        tokio::time::timeout(Duration::from_secs(1), request_started.notified())
            .await
            .expect("request should start");

        // Second submit lands while Awaiting and is rejected.
        rt.send_text("second").await;
        let error = rt.wait_for_error(Duration::from_secs(1)).await.unwrap();
        assert!(error.contains("already in flight"));

        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let msgs = rt.messages().await;
        // welcome + first + reply; "second" appended nothing.
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].text, "first");

        // Only one request ever went out.
        assert_eq!(rt.client.inner.requests.lock().unwrap().len(), 1);
    }

    /// A failed request yields a well-formed terminating model message and
    /// records the session's last error; the conversation stays usable.
    #[tokio::test]
    async fn request_failure_synthesizes_model_reply() {
        let mut rt = TestRuntime::new();
        rt.client.queue_error(LlmError::auth("API key not valid"));
        rt.client
            .queue_response(GroundedResponse::text_only("recovered"));

        rt.send_text("hello?").await;
        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let snapshot = rt.transcript.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.len(), 3);
        let reply = snapshot.messages.last().unwrap();
        assert_eq!(reply.role, Role::Model);
        assert_eq!(
            reply.text,
            format!("Sorry, I encountered an error: {REQUEST_FAILURE_MESSAGE}")
        );
        assert!(reply.citations.is_empty());
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some(REQUEST_FAILURE_MESSAGE)
        );
        assert!(!snapshot.pending);

        // Further sends still work, and the prior error is cleared.
        rt.send_text("try again").await;
        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let snapshot = rt.transcript.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.len(), 5);
        assert_eq!(snapshot.messages.last().unwrap().text, "recovered");
        assert!(snapshot.last_error.is_none());
    }

    /// A response with no grounding metadata yields an empty citation list.
    #[tokio::test]
    async fn ungrounded_reply_has_empty_citations() {
        let mut rt = TestRuntime::new();
        rt.client
            .queue_response(GroundedResponse::text_only("no sources"));

        rt.send_text("hi").await;
        assert!(rt.wait_for_done(Duration::from_secs(2)).await);

        let msgs = rt.messages().await;
        assert_eq!(msgs.last().unwrap().citations, Vec::<Citation>::new());
    }

    /// Pending is true strictly between dispatch and resolution.
    #[tokio::test]
    async fn pending_tracks_request_lifecycle() {
        let client = DelayedMockGroundedClient::new(Duration::from_millis(100));
        client.queue_response(GroundedResponse::text_only("done"));
        let request_started = client.request_started.clone();

        let mut rt = TestRuntime::with_client_and_location(
            client,
            MockLocationSource::failing(LocationError::unsupported("unsupported")),
        );

        assert!(!rt.transcript.snapshot().await.unwrap().pending);

        rt.send_text("go").await;
        tokio::time::timeout(Duration::from_secs(1), request_started.notified())
            .await
            .expect("request should start");
        assert!(rt.transcript.snapshot().await.unwrap().pending);

        assert!(rt.wait_for_done(Duration::from_secs(2)).await);
        assert!(!rt.transcript.snapshot().await.unwrap().pending);
    }
}
