//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::llm::Citation;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ?!,.]{0,40}"
}

fn arb_citation() -> impl Strategy<Value = Citation> {
    (
        any::<bool>(),
        "[a-z]{3,12}",
        proptest::option::of("[a-zA-Z ]{1,20}"),
    )
        .prop_map(|(web, slug, title)| {
            let uri = format!("http://{slug}");
            if web {
                Citation::web(uri, title)
            } else {
                Citation::map(uri, title)
            }
        })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::Submit { text }),
        (arb_text(), proptest::collection::vec(arb_citation(), 0..4))
            .prop_map(|(text, citations)| Event::GenerationComplete { text, citations }),
        arb_text().prop_map(|message| Event::GenerationFailed { message }),
    ]
}

fn arb_resolution() -> impl Strategy<Value = Event> {
    prop_oneof![
        (arb_text(), proptest::collection::vec(arb_citation(), 0..4))
            .prop_map(|(text, citations)| Event::GenerationComplete { text, citations }),
        arb_text().prop_map(|message| Event::GenerationFailed { message }),
    ]
}

// ============================================================================
// Transcript Interpreter
// ============================================================================

/// Applies accepted transitions' append effects to a role sequence, the way
/// the runtime applies them to the transcript. Seeded with the welcome role.
struct TranscriptModel {
    state: ChatState,
    roles: Vec<Role>,
}

impl TranscriptModel {
    fn new() -> Self {
        Self {
            state: ChatState::Idle,
            roles: vec![Role::Model],
        }
    }

    fn apply(&mut self, event: Event) {
        let Ok(result) = transition(&self.state, event) else {
            // Rejected events mutate nothing.
            return;
        };
        for effect in &result.effects {
            match effect {
                Effect::AppendUserMessage { .. } => self.roles.push(Role::User),
                Effect::AppendModelMessage { .. } => self.roles.push(Role::Model),
                _ => {}
            }
        }
        self.state = result.new_state;
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A submit while a request is in flight is rejected, so it can never
    /// grow the transcript.
    #[test]
    fn submit_while_awaiting_is_rejected(text in arb_text()) {
        let result = transition(&ChatState::Awaiting, Event::Submit { text });
        prop_assert!(matches!(result, Err(TransitionError::RequestInFlight)));
    }

    /// An accepted submit appends exactly one user message and dispatches
    /// exactly one request, entering the pending state.
    #[test]
    fn accepted_submit_appends_one_user_message(text in arb_text()) {
        let result = transition(&ChatState::Idle, Event::Submit { text: text.clone() }).unwrap();

        prop_assert_eq!(&result.new_state, &ChatState::Awaiting);
        prop_assert!(result.new_state.is_pending());

        let appends = result.effects.iter()
            .filter(|e| matches!(e, Effect::AppendUserMessage { .. }))
            .count();
        prop_assert_eq!(appends, 1);

        let requests: Vec<_> = result.effects.iter()
            .filter_map(|e| match e {
                Effect::RequestGeneration { prompt } => Some(prompt.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(requests, vec![text]);
    }

    /// Every resolution (success or failure) returns to Idle and appends
    /// exactly one model message — never zero, never more than one.
    #[test]
    fn resolution_appends_exactly_one_model_message(event in arb_resolution()) {
        let result = transition(&ChatState::Awaiting, event).unwrap();

        prop_assert_eq!(&result.new_state, &ChatState::Idle);
        prop_assert!(!result.new_state.is_pending());

        let appends = result.effects.iter()
            .filter(|e| matches!(e, Effect::AppendModelMessage { .. }))
            .count();
        prop_assert_eq!(appends, 1);
    }

    /// A failed request always synthesizes a reply carrying the literal
    /// error prefix followed by the surfaced message.
    #[test]
    fn failure_reply_carries_prefix(message in arb_text()) {
        let result = transition(
            &ChatState::Awaiting,
            Event::GenerationFailed { message: message.clone() },
        ).unwrap();

        let reply = result.effects.iter().find_map(|e| match e {
            Effect::AppendModelMessage { text, .. } => Some(text.clone()),
            _ => None,
        }).unwrap();

        prop_assert_eq!(reply, format!("{ERROR_REPLY_PREFIX}{message}"));
    }

    /// Across arbitrary event sequences, the transcript alternates
    /// user/model after the seed message and no user message is left
    /// unanswered once the machine is idle.
    #[test]
    fn transcript_alternates_with_no_orphaned_user(events in proptest::collection::vec(arb_event(), 0..24)) {
        let mut model = TranscriptModel::new();
        for event in events {
            model.apply(event);

            // Seed is model; thereafter roles alternate user, model, ...
            prop_assert_eq!(model.roles[0], Role::Model);
            for pair in model.roles.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }

            // Once idle, every user message has its model follow-up.
            if model.state == ChatState::Idle {
                prop_assert_eq!(*model.roles.last().unwrap(), Role::Model);
                let users = model.roles.iter().filter(|r| **r == Role::User).count();
                let models = model.roles.iter().filter(|r| **r == Role::Model).count();
                prop_assert_eq!(models, users + 1);
            }
        }
    }
}
