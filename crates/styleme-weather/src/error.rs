//! Weather-specific error types.

use styleme_core::{AppError, ConfigError, NetworkError, WeatherError};
use thiserror::Error;

/// Failures while determining where the user is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable")]
    ServiceUnavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Coordinate out of range: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("IP location lookup failed: {0}")]
    Lookup(String),

    /// Both the sensor and the IP lookup failed.
    #[error("Location unavailable (sensor: {sensor}; lookup: {lookup})")]
    Unavailable { sensor: String, lookup: String },
}

/// Failures while fetching or reading a provider response.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Response has no current conditions")]
    MissingCurrentCondition,

    #[error("Provider reported: {0}")]
    Embedded(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Why the primary (location based) attempt failed.
#[derive(Error, Debug, Clone)]
pub enum AttemptError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Terminal outcome of a failed acquisition run.
#[derive(Error, Debug, Clone)]
pub enum AcquisitionError {
    /// Rejected before any network traffic. Retrying will not help.
    #[error("Weather configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Primary attempt and the single fallback-city fetch both failed.
    #[error("Weather unavailable: {primary}; fallback to {city} failed: {fallback}")]
    Exhausted {
        city: String,
        primary: AttemptError,
        fallback: ProviderError,
    },
}

impl AcquisitionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

impl From<AcquisitionError> for AppError {
    fn from(err: AcquisitionError) -> Self {
        match err {
            AcquisitionError::Configuration(e) => AppError::Config(e),
            AcquisitionError::Exhausted {
                city,
                primary,
                fallback,
            } => {
                let reason = format!("{primary}; {fallback}");
                let weather = match primary {
                    AttemptError::Location(_) => WeatherError::LocationUnavailable { city, reason },
                    AttemptError::Provider(_) => WeatherError::FallbackExhausted { city, reason },
                };
                AppError::Weather(weather)
            }
        }
    }
}
