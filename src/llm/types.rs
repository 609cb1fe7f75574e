//! Common types for grounded generation

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// A single grounded generation request
#[derive(Debug, Clone)]
pub struct GroundedRequest {
    pub prompt: String,
    /// Retrieval bias; attached to the request only when present
    pub coordinates: Option<Coordinates>,
}

impl GroundedRequest {
    pub fn new(prompt: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            prompt: prompt.into(),
            coordinates,
        }
    }
}

/// Where a citation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Web,
    Map,
}

/// A source the backend used to justify part of its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source_type: SourceType,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Citation {
    pub fn web(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            source_type: SourceType::Web,
            uri: uri.into(),
            title,
        }
    }

    pub fn map(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            source_type: SourceType::Map,
            uri: uri.into(),
            title,
        }
    }
}

/// Result of a grounded generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedResponse {
    /// Generated text; may be empty if the backend returned none
    pub text: String,
    /// Flattened, order-preserving citations; empty when the backend
    /// attached no grounding metadata, never absent
    pub citations: Vec<Citation>,
}

impl GroundedResponse {
    #[allow(dead_code)] // Constructor for API completeness
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: vec![],
        }
    }
}
