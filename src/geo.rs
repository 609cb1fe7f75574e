//! One-shot device position acquisition
//!
//! The browser original resolved position from the platform geolocation API;
//! a headless backend uses an IP-geolocation endpoint instead. Acquisition
//! happens at most once per session and produces a single terminal outcome;
//! downstream consumers treat "no coordinates" as a valid, permanent state.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Cap on how long a session will wait for a position fix
const ACQUISITION_TIMEOUT: Duration = Duration::from_secs(10);

/// A geographic position, immutable once acquired
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Position acquisition error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::Unsupported, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::PermissionDenied, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::Timeout, message)
    }
}

/// Why a position fix could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    /// No acquisition source available in this environment
    Unsupported,
    /// The position source refused the request
    PermissionDenied,
    /// The source answered but no usable fix was produced
    Unavailable,
    /// The acquisition cap elapsed
    Timeout,
}

/// Tri-state of the session's position: loading, acquired, or failed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationStatus {
    Acquiring,
    Acquired { coordinates: Coordinates },
    Failed { message: String },
}

impl LocationStatus {
    /// Coordinates, if acquisition has succeeded
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationStatus::Acquired { coordinates } => Some(*coordinates),
            _ => None,
        }
    }

    /// True until the terminal outcome is produced
    #[allow(dead_code)] // State query utility
    pub fn is_acquiring(&self) -> bool {
        matches!(self, LocationStatus::Acquiring)
    }
}

/// One-shot position provider backed by an IP-geolocation endpoint
pub struct LocationProvider {
    client: Client,
    endpoint: Option<String>,
}

impl LocationProvider {
    /// `endpoint: None` disables acquisition; `acquire` then reports
    /// `Unsupported` without touching the network.
    pub fn new(endpoint: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(ACQUISITION_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }

    /// Attempt one acquisition. Callers invoke this exactly once per
    /// session; there is no re-acquisition, polling, or cancellation.
    pub async fn acquire(&self) -> Result<Coordinates, LocationError> {
        let Some(endpoint) = &self.endpoint else {
            return Err(LocationError::unsupported(
                "Geolocation is not supported in this environment.",
            ));
        };

        let response = self.client.get(endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::timeout("Error getting location: request timed out")
            } else {
                tracing::warn!(error = %e, "Geolocation request failed");
                LocationError::unavailable("Error getting location: position unavailable")
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(LocationError::permission_denied(
                "Error getting location: permission denied by position source",
            ));
        }
        if !status.is_success() {
            tracing::warn!(status = %status, "Geolocation endpoint returned error status");
            return Err(LocationError::unavailable(
                "Error getting location: position unavailable",
            ));
        }

        let fix: GeoFix = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse geolocation response");
            LocationError::unavailable("Error getting location: position unavailable")
        })?;

        fix.into_coordinates()
    }
}

/// Wire format of the IP-geolocation endpoint (ip-api.com JSON schema)
#[derive(Debug, Deserialize)]
struct GeoFix {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl GeoFix {
    fn into_coordinates(self) -> Result<Coordinates, LocationError> {
        if self.status.as_deref() == Some("fail") {
            let reason = self.message.unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(reason = %reason, "Geolocation endpoint reported failure");
            return Err(LocationError::unavailable(
                "Error getting location: position unavailable",
            ));
        }

        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(LocationError::unavailable(
                "Error getting location: position unavailable",
            ));
        };

        let coordinates = Coordinates::new(lat, lon);
        if !coordinates.is_valid() {
            return Err(LocationError::unavailable(
                "Error getting location: position out of range",
            ));
        }

        Ok(coordinates)
    }
}
