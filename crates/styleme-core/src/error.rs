//! Centralized error types for the StyleMe application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in StyleMe should be convertible to this type.
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Whether offering a manual retry makes sense for this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::Weather(e) => e.is_retryable(),
            AppError::Storage(_) | AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => {
                false
            }
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Local storage errors (wardrobe database).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ConnectionFailed(_) => {
                "Unable to open your wardrobe. Try restarting the app."
            }
            StorageError::QueryFailed(_) => "A wardrobe operation failed. Please try again.",
            StorageError::Corruption(_) => {
                "Wardrobe data may be corrupted. Consider resetting app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Weather acquisition errors as seen by the application layer.
///
/// Both variants mean the fallback city failed too; they differ in what
/// broke the primary attempt.
#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    /// No sensor fix and no IP location.
    #[error("Location unavailable ({reason}); fallback to {city} failed")]
    LocationUnavailable { city: String, reason: String },

    /// The provider failed for the resolved location.
    #[error("Weather unavailable after fallback to {city}: {reason}")]
    FallbackExhausted { city: String, reason: String },
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationUnavailable { .. } => {
                "Couldn't determine your location or load weather data. Tap retry to try again."
            }
            WeatherError::FallbackExhausted { .. } => {
                "Unable to load weather data. Tap retry to try again."
            }
        }
    }

    /// All weather failures are transient from the user's point of view.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_storage_error(self) -> StorageError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_storage_error(self) -> StorageError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                StorageError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::CannotOpen =>
            {
                StorageError::ConnectionFailed(self.to_string())
            }
            _ => StorageError::QueryFailed(self.to_string()),
        }
    }
}
