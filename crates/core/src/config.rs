//! Harness configuration.
//!
//! Configuration is read from an optional JSON document. Every field has a
//! default, so `{}` is a valid config and a missing file means defaults.
//!
//! ```
//! let config = stage_core::StageConfig::from_json(r#"{ "window": { "width": 640 } }"#).unwrap();
//! assert_eq!(config.window.width, 640);
//! assert_eq!(config.window.height, 720);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Demo selected when none is given on the command line.
    pub demo: Option<String>,
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub retry: RetryConfig,
    pub capture: CaptureConfig,
}

/// Initial window (container) settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "stage".to_string(),
        }
    }
}

/// Where textures and other assets are read from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

/// Retry and timeout policy for asset fetches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f32,
    /// Upper bound on a single attempt.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            backoff_factor: 2.0,
            attempt_timeout_ms: 5_000,
        }
    }
}

/// Resolution requested from the media-capture collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl StageConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the harness cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(Error::Config(format!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".into()));
        }
        if !(self.retry.backoff_factor >= 1.0) {
            return Err(Error::Config(format!(
                "retry.backoff_factor must be >= 1.0, got {}",
                self.retry.backoff_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = StageConfig::from_json("{}").unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_partial_override() {
        let config = StageConfig::from_json(
            r#"{ "demo": "scenegraph", "retry": { "max_attempts": 5 }, "assets": { "root": "/srv/tex" } }"#,
        )
        .unwrap();

        assert_eq!(config.demo.as_deref(), Some("scenegraph"));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 100);
        assert_eq!(config.assets.root, PathBuf::from("/srv/tex"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = StageConfig::from_json(r#"{ "window": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = StageConfig::from_json(r#"{ "retry": { "max_attempts": 0 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_shrinking_backoff_rejected() {
        let err = StageConfig::from_json(r#"{ "retry": { "backoff_factor": 0.5 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_field_is_json_error() {
        let err = StageConfig::from_json(r#"{ "fullscreen": true }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "window": {{ "width": 800, "height": 600, "title": "demo" }} }}"#).unwrap();

        let config = StageConfig::load(file.path()).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "demo");
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = StageConfig::load_or_default(None).unwrap();
        assert_eq!(config, StageConfig::default());
    }
}
