//! Error types for the harness.

use thiserror::Error;

/// Main error type for the harness.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),

    /// Scene graph errors (unknown nodes, cycles)
    #[error("Scene error: {0}")]
    Scene(String),

    /// Resource loading errors surfaced outside the resource crate
    #[error("Resource error: {0}")]
    Resource(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the harness's Error type.
pub type Result<T> = std::result::Result<T, Error>;
