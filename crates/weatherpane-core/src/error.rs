//! Centralized error types for weatherpane.
//!
//! This module provides a typed error hierarchy that:
//! - Names each failure mode of the location/weather/render pipeline
//! - Provides user-friendly messages suitable for printing
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Every pipeline stage error converts into this type.
/// Use `user_message()` to get a message suitable for end users.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(anyhow::Error),
}

/// Typed config errors carried inside an `anyhow` chain keep their variant.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConfigError>() {
            Ok(config) => AppError::Config(config),
            Err(other) => AppError::Other(other),
        }
    }
}

impl AppError {
    /// Returns a user-friendly message.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Render(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
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

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Location resolution errors.
///
/// `PermissionDenied` and `Timeout` only come from the native provider; the
/// resolver does not fall back to IP lookup when either occurs.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable")]
    ServiceUnavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location lookup failed: {0}")]
    Network(#[from] NetworkError),

    #[error("Location response invalid: {0}")]
    InvalidResponse(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Allow location access and try again."
            }
            LocationError::ServiceUnavailable => "No location service is available.",
            LocationError::Timeout => "Finding your location took too long. Please try again.",
            LocationError::Network(e) => e.user_message(),
            LocationError::InvalidResponse(_) => "Could not determine your location.",
        }
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Weather API error ({kind}): {description}")]
    Api { kind: String, description: String },

    #[error("Weather request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::Api { .. } => "Weather service error. Please try again.",
            WeatherError::Network(e) => e.user_message(),
            WeatherError::MalformedResponse(_) => {
                "The weather service sent data in an unexpected format."
            }
        }
    }
}

/// Page rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Container element with class '{0}' not found")]
    ContainerMissing(String),

    #[error("Reveal stopped before every forecast day was shown: {0}")]
    RevealInterrupted(String),
}

impl RenderError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RenderError::ContainerMissing(_) => "The page has no place to show the weather.",
            RenderError::RevealInterrupted(_) => "The forecast stopped updating part way through.",
        }
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
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
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
