//! Resource loading and external collaborators.
//!
//! This crate handles everything that arrives from outside the scene:
//! - Texture decoding and sampling
//! - The asset-loader and media-capture collaborator traits
//! - Retry, timeout and cancellation around collaborator calls

pub mod error;
pub mod loader;
pub mod media;
pub mod retry;
pub mod texture;

pub use error::{Availability, ResourceError, ResourceResult};
pub use loader::{AssetLoader, FileAssetLoader};
pub use media::{MediaCapture, MediaConstraints, SyntheticCapture, UnsupportedCapture, VideoSource};
pub use retry::{CancellationToken, RetryPolicy};
pub use texture::{Filter, Texture, Wrap};
