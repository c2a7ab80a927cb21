//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("No backends configured")]
    NoBackends,

    #[error("Backend '{backend}' is missing {field}")]
    BackendMissing {
        backend: String,
        field: &'static str,
    },

    #[error("Backend '{backend}' has an invalid URL: {url}")]
    InvalidBackendUrl { backend: String, url: String },

    #[error("Invalid timeout: {0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Poll attempts must be greater than zero")]
    InvalidPollAttempts,

    #[error("Poll schedule must contain at least one non-zero delay")]
    InvalidPollSchedule,

    #[error("Stream answer frame is 1-based and must be greater than zero")]
    InvalidAnswerFrame,

    #[error("Chat endpoint must be an http(s) URL")]
    InvalidChatEndpoint,

    #[error("Chat max_retries must be at most {max}")]
    TooManyRetries { max: u32 },
}
