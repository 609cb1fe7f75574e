//! Events that can occur in a session

use crate::geo::{Coordinates, LocationError};
use crate::llm::Citation;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted a message
    Submit { text: String },

    /// The in-flight generation request resolved successfully
    GenerationComplete {
        text: String,
        citations: Vec<Citation>,
    },

    /// The in-flight generation request failed.
    ///
    /// `message` is already user-safe; raw provider errors never cross the
    /// state-machine boundary.
    GenerationFailed { message: String },

    /// The one-shot position acquisition produced its terminal outcome.
    /// Handled at the runtime level; never reaches the transition function.
    LocationResolved {
        outcome: Result<Coordinates, LocationError>,
    },
}
