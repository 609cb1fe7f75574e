//! Grounded generation client
//!
//! A stateless request/response wrapper around the remote generation
//! service, optionally biased by coordinates.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind, REQUEST_FAILURE_MESSAGE};
pub use gemini::GeminiClient;
pub use types::{Citation, GroundedRequest, GroundedResponse, SourceType};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for grounded generation backends
#[async_trait]
pub trait GroundedClient: Send + Sync {
    /// Make exactly one generation request; no retries, no caching.
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: GroundedClient + ?Sized> GroundedClient for Arc<T> {
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError> {
        (**self).generate(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for grounded clients
pub struct LoggingClient {
    inner: Arc<dyn GroundedClient>,
    model_id: String,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn GroundedClient>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl GroundedClient for LoggingClient {
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    located = request.coordinates.is_some(),
                    citations = response.citations.len(),
                    "Generation request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Generation request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
