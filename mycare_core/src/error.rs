//! Error types for the mycare_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mycare_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The most recent cycle start could not be parsed, so nothing can be projected
    #[error("Cannot anchor prediction: {0}")]
    Anchor(String),

    /// Caller-supplied fallback averages outside the plausible range
    #[error("Invalid fallback average: {0}")]
    InvalidFallback(String),

    /// A user-supplied date was rejected
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No logged cycle with the given id
    #[error("Cycle not found: {0}")]
    NotFound(Uuid),

    /// Cycle store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
