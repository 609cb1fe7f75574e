//! Generation error types

use thiserror::Error;

/// User-safe failure message for request errors. The underlying cause is
/// logged, never surfaced.
pub const REQUEST_FAILURE_MESSAGE: &str =
    "Failed to get response from Gemini. Please check your API key and network connection.";

/// Generation error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Config, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Malformed, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    /// The message shown to the user. Configuration errors carry their own
    /// distinct message; every request error renders uniformly.
    pub fn user_message(&self) -> String {
        match self.kind {
            LlmErrorKind::Config => self.message.clone(),
            _ => REQUEST_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Missing or invalid credential configuration; fatal to any send and
    /// raised before network I/O
    Config,
    /// Transport failure or timeout
    Network,
    /// Authentication rejected (401, 403)
    Auth,
    /// Rate limited (429)
    RateLimit,
    /// Backend-side failure (5xx)
    ServerError,
    /// Bad request (400)
    InvalidRequest,
    /// Backend answered with a payload we could not use
    Malformed,
    /// Unknown error
    Unknown,
}

impl LlmErrorKind {
    /// Configuration errors abort the session; everything else leaves the
    /// conversation usable for further sends.
    #[allow(dead_code)] // Taxonomy query utility
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Config)
    }
}
