//! Pure state transition function

use super::{ChatState, Effect, Event};
use thiserror::Error;

/// Literal prefix of the synthesized reply for a failed request
pub const ERROR_REPLY_PREFIX: &str = "Sorry, I encountered an error: ";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("A request is already in flight; wait for the current response")]
    RequestInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// Enforces the at-most-one-in-flight invariant: a rejected event produces
/// no effects, so the transcript provably only grows via accepted
/// transitions.
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + Submit -> Awaiting: append the user message, clear any
        // prior error, dispatch the request.
        (ChatState::Idle, Event::Submit { text }) => {
            Ok(TransitionResult::new(ChatState::Awaiting)
                .with_effect(Effect::ClearError)
                .with_effect(Effect::append_user(text.clone()))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestGeneration { prompt: text }))
        }

        // Submit while a request is in flight is rejected.
        (ChatState::Awaiting, Event::Submit { .. }) => Err(TransitionError::RequestInFlight),

        // Awaiting + success -> Idle: exactly one model message.
        (ChatState::Awaiting, Event::GenerationComplete { text, citations }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::append_model(text, citations))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::NotifyDone))
        }

        // Awaiting + failure -> Idle: the failure is recorded and coerced
        // into a well-formed terminating model message, so the user message
        // is never left orphaned.
        (ChatState::Awaiting, Event::GenerationFailed { message }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::RecordError {
                    message: message.clone(),
                })
                .with_effect(Effect::append_model(
                    format!("{ERROR_REPLY_PREFIX}{message}"),
                    vec![],
                ))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::NotifyDone))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
