//! Error types for applicant-harvest
//!
//! Only configuration, state-file and export problems surface as errors.
//! Page- and candidate-level failures are contained where they happen and
//! degrade to "no summaries" or placeholder records instead of propagating.

use thiserror::Error;

/// Result type alias for applicant-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for applicant-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_token")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export error (anything the export collaborator could not recover from)
    #[error("export error: {0}")]
    Export(String),

    /// Progress state file error
    #[error("state error: {0}")]
    State(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
