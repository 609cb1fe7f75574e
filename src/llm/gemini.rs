//! Gemini `generateContent` client with search grounding

use super::types::{Citation, GroundedRequest, GroundedResponse};
use super::{GroundedClient, LlmError};
use crate::geo::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client implementation
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// Create a client for the given model.
    ///
    /// The credential is validated here, before any request is attempted; an
    /// empty key is a configuration error, not a request error.
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::config(
                "GEMINI_API_KEY environment variable not set",
            ));
        }

        let model = model.into();
        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        let endpoint = format!("{base}/models/{model}:generateContent");

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
        })
    }

    fn build_request(request: &GroundedRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            // Both capabilities are always declared; the backend decides
            // which to use for a given prompt.
            tools: vec![
                GeminiTool::GoogleSearch(EmptyConfig {}),
                GeminiTool::GoogleMaps(EmptyConfig {}),
            ],
            tool_config: request.coordinates.map(|lat_lng| GeminiToolConfig {
                retrieval_config: RetrievalConfig { lat_lng },
            }),
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<GroundedResponse, LlmError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No candidates in response"))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|metadata| flatten_chunks(metadata.grounding_chunks))
            .unwrap_or_default();

        Ok(GroundedResponse { text, citations })
    }
}

/// Flatten grounding chunks into an order-preserving citation list
fn flatten_chunks(chunks: Vec<GroundingChunk>) -> Vec<Citation> {
    let mut citations = Vec::new();
    for chunk in chunks {
        if let Some(web) = chunk.web {
            if let Some(uri) = web.uri {
                citations.push(Citation::web(uri, web.title));
            }
        }
        if let Some(maps) = chunk.maps {
            if let Some(uri) = maps.uri {
                citations.push(Citation::map(uri, maps.title));
            }
        }
    }
    citations
}

fn classify_status(status: reqwest::StatusCode, message: String) -> LlmError {
    match status.as_u16() {
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl GroundedClient for GeminiClient {
    async fn generate(&self, request: &GroundedRequest) -> Result<GroundedResponse, LlmError> {
        let gemini_request = Self::build_request(request);
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                return Err(classify_status(status, error_resp.error.message));
            }
            return Err(LlmError::unknown(format!("HTTP {status} error: {body}")));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
enum GeminiTool {
    #[serde(rename = "googleSearch")]
    GoogleSearch(EmptyConfig),
    #[serde(rename = "googleMaps")]
    GoogleMaps(EmptyConfig),
}

#[derive(Debug, Serialize)]
struct EmptyConfig {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: Coordinates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<GroundingSource>,
    maps: Option<GroundingSource>,
}

#[derive(Debug, Deserialize)]
struct GroundingSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}
