//! Process configuration
//!
//! Configuration is resolved once at startup and passed into constructors
//! explicitly; nothing below this module reads the environment.

use thiserror::Error;

/// Default Gemini model used for grounded generation
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default IP-geolocation endpoint
pub const DEFAULT_LOCATION_URL: &str = "http://ip-api.com/json";

const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
}

/// Resolved configuration for the session
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. Required; validated non-empty before any request.
    pub api_key: String,
    /// Model name passed to `generateContent`
    pub model: String,
    /// Listen port for the HTTP surface
    pub port: u16,
    /// Override for the Gemini API base URL (tests, gateways)
    pub base_url: Option<String>,
    /// IP-geolocation endpoint; `None` disables acquisition entirely
    pub location_url: Option<String>,
}

impl Config {
    /// Build configuration from the environment.
    ///
    /// A missing or empty `GEMINI_API_KEY` is a fatal precondition and is
    /// reported before any network I/O happens.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model =
            std::env::var("GEOCHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let port: u16 = std::env::var("GEOCHAT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let base_url = std::env::var("GEOCHAT_GEMINI_URL").ok();

        let location_url = if std::env::var("GEOCHAT_DISABLE_LOCATION").is_ok() {
            None
        } else {
            Some(
                std::env::var("GEOCHAT_LOCATION_URL")
                    .unwrap_or_else(|_| DEFAULT_LOCATION_URL.to_string()),
            )
        };

        Ok(Self {
            api_key,
            model,
            port,
            base_url,
            location_url,
        })
    }
}
