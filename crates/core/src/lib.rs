//! Core utilities for the stage demo harness.
//!
//! This crate provides foundational types used across the workspace:
//! - Error types and result aliases
//! - Logging initialization
//! - Timer and frame clock utilities
//! - Configuration loading

mod config;
mod error;
mod logging;
mod timer;

pub use config::{AssetConfig, CaptureConfig, RetryConfig, StageConfig, WindowConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::{FrameClock, FrameTime};
