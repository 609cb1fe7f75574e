//! Session runtime executor

use super::traits::{LocationSource, TranscriptStore};
use super::SseEvent;
use crate::geo::{Coordinates, LocationError, LocationStatus};
use crate::llm::{GroundedClient, GroundedRequest};
use crate::state_machine::{transition, ChatState, Effect, Event, Role};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Generic session runtime that can work with any transcript, client, and
/// location implementations
pub struct SessionRuntime<S, C, L>
where
    S: TranscriptStore + 'static,
    C: GroundedClient + 'static,
    L: LocationSource + 'static,
{
    state: ChatState,
    transcript: S,
    client: Arc<C>,
    location_source: Arc<L>,
    /// Terminal outcome of the one-shot acquisition, shared with renderers
    location: Arc<RwLock<LocationStatus>>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl<S, C, L> SessionRuntime<S, C, L>
where
    S: TranscriptStore + 'static,
    C: GroundedClient + 'static,
    L: LocationSource + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: ChatState,
        transcript: S,
        client: C,
        location_source: L,
        location: Arc<RwLock<LocationStatus>>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        Self {
            state,
            transcript,
            client: Arc::new(client),
            location_source: Arc::new(location_source),
            location,
            event_rx,
            event_tx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting session runtime");

        // Dispatch the one-shot position acquisition explicitly at startup;
        // its terminal outcome arrives on the same event queue as everything
        // else. No re-acquisition, no polling.
        {
            let source = self.location_source.clone();
            let event_tx = self.event_tx.clone();
            tokio::spawn(async move {
                let outcome = source.acquire().await;
                let _ = event_tx.send(Event::LocationResolved { outcome }).await;
            });
        }

        // Process events in a loop - no recursion
        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event).await {
                        tracing::error!(error = %e, "Error handling event");
                        let _ = self.broadcast_tx.send(SseEvent::Error { message: e });
                    }
                }
                else => break,
            }
        }

        tracing::info!("Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        // Location resolution never reaches the transition function; it
        // only updates the status cell read by renders and by future
        // request snapshots.
        let event = match event {
            Event::LocationResolved { outcome } => {
                self.handle_location_resolved(outcome).await;
                return Ok(());
            }
            other => other,
        };

        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejections are user-facing (e.g. submit while a request
                // is in flight); the transcript is untouched.
                tracing::warn!(error = %e, "Event rejected");
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: e.to_string(),
                });
                return Ok(());
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await?;
        }

        Ok(())
    }

    async fn handle_location_resolved(&self, outcome: Result<Coordinates, LocationError>) {
        let status = match outcome {
            Ok(coordinates) => {
                tracing::info!(
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Position acquired"
                );
                LocationStatus::Acquired { coordinates }
            }
            Err(e) => {
                // Non-fatal: the session proceeds without coordinates.
                tracing::warn!(kind = ?e.kind, error = %e, "Position acquisition failed");
                LocationStatus::Failed { message: e.message }
            }
        };

        *self.location.write().await = status.clone();
        let _ = self.broadcast_tx.send(SseEvent::Location { status });
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<(), String> {
        match effect {
            Effect::AppendUserMessage { text } => {
                let message = self.transcript.append(Role::User, &text, vec![]).await?;
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
                Ok(())
            }

            Effect::AppendModelMessage { text, citations } => {
                let message = self
                    .transcript
                    .append(Role::Model, &text, citations)
                    .await?;
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
                Ok(())
            }

            Effect::RecordError { message } => self.transcript.record_error(&message).await,

            Effect::ClearError => self.transcript.clear_error().await,

            Effect::PublishState => {
                self.transcript.set_pending(self.state.is_pending()).await?;
                let _ = self.broadcast_tx.send(SseEvent::StateChange {
                    state: self.state.clone(),
                });
                Ok(())
            }

            Effect::NotifyDone => {
                let _ = self.broadcast_tx.send(SseEvent::Done);
                Ok(())
            }

            Effect::RequestGeneration { prompt } => {
                // Coordinates are snapshotted at dispatch time; a fix that
                // lands mid-flight applies to the next request.
                let coordinates = self.location.read().await.coordinates();
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    let request = GroundedRequest::new(prompt, coordinates);
                    let event = match client.generate(&request).await {
                        Ok(response) => Event::GenerationComplete {
                            text: response.text,
                            citations: response.citations,
                        },
                        Err(e) => Event::GenerationFailed {
                            message: e.user_message(),
                        },
                    };
                    let _ = event_tx.send(event).await;
                });

                Ok(())
            }
        }
    }
}
