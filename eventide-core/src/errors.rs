use std::io;

use thiserror::Error;

/// Result type used across the Eventide core crate.
pub type Result<T> = std::result::Result<T, EventideError>;

/// Canonical error representation shared by all services.
#[derive(Debug, Error)]
pub enum EventideError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("event validation failed: {0}")]
    EventValidationError(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("timeline error: {0}")]
    TimelineError(String),

    #[error("source `{module}` failed: {message}")]
    SourceError { module: String, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("general error: {0}")]
    GeneralError(String),
}

impl From<serde_json::Error> for EventideError {
    fn from(err: serde_json::Error) -> Self {
        EventideError::DeserializationError(err.to_string())
    }
}

impl From<anyhow::Error> for EventideError {
    fn from(err: anyhow::Error) -> Self {
        EventideError::GeneralError(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable missing: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConfigError> for EventideError {
    fn from(value: ConfigError) -> Self {
        EventideError::ConfigError(value.to_string())
    }
}
