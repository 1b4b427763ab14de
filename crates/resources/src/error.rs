//! Error types for resource loading and collaborator calls.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Whether a failed collaborator call is worth repeating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// Temporarily unavailable; a later attempt may succeed.
    Retryable,
    /// Permanently unsupported or refused for this session.
    Permanent,
}

/// Error type for resource loading operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but could not be decoded.
    #[error("Failed to decode '{path}': {message}")]
    Decode {
        /// Path to the file that failed to decode.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Image loading error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single attempt took longer than the policy allows.
    #[error("Timed out after {after:?} loading '{what}'")]
    Timeout {
        /// What was being loaded.
        what: String,
        /// The per-attempt limit that was exceeded.
        after: Duration,
    },

    /// The request was cancelled before it completed.
    #[error("Cancelled")]
    Cancelled,

    /// The user or host refused access (e.g. camera permission).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The device exists but cannot be used right now.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The host lacks the capability entirely.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl ResourceError {
    /// Classify the failure for retry decisions.
    pub fn availability(&self) -> Availability {
        match self {
            ResourceError::Timeout { .. }
            | ResourceError::DeviceUnavailable(_)
            | ResourceError::Io(_) => Availability::Retryable,
            _ => Availability::Permanent,
        }
    }

    /// Shorthand for `availability() == Availability::Retryable`.
    pub fn is_retryable(&self) -> bool {
        self.availability() == Availability::Retryable
    }
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        let timeout = ResourceError::Timeout {
            what: "1.jpg".into(),
            after: Duration::from_millis(10),
        };
        assert!(timeout.is_retryable());
        assert!(ResourceError::DeviceUnavailable("busy".into()).is_retryable());
        assert!(ResourceError::Io(std::io::Error::other("reset")).is_retryable());
    }

    #[test]
    fn test_permanent_kinds() {
        assert_eq!(
            ResourceError::PermissionDenied("camera".into()).availability(),
            Availability::Permanent
        );
        assert!(!ResourceError::Unsupported("media devices".into()).is_retryable());
        assert!(!ResourceError::FileNotFound("missing.png".into()).is_retryable());
        assert!(!ResourceError::Cancelled.is_retryable());
    }
}
