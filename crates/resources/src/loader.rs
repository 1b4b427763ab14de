//! Asset loader collaborator.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ResourceError, ResourceResult};
use crate::texture::Texture;

/// Fetches and decodes assets.
///
/// Implementations may block; the harness always calls them from a worker
/// thread under a [`RetryPolicy`](crate::RetryPolicy).
pub trait AssetLoader: Send + Sync {
    /// Load and decode a texture.
    ///
    /// # Arguments
    /// * `path` - Asset path, relative to the loader's root
    ///
    /// # Returns
    /// The decoded texture or an error
    fn load_texture(&self, path: &Path) -> ResourceResult<Texture>;
}

/// Loads assets from a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset path against the root. Absolute paths pass through.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetLoader for FileAssetLoader {
    fn load_texture(&self, path: &Path) -> ResourceResult<Texture> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(ResourceError::FileNotFound(full));
        }

        debug!("Decoding texture {:?}", full);
        let image = image::open(&full).map_err(|e| match e {
            image::ImageError::IoError(io) => ResourceError::Io(io),
            other => ResourceError::Decode {
                path: full.clone(),
                message: other.to_string(),
            },
        })?;
        let image = image.to_rgba8();

        info!(
            "Loaded texture {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );

        let mut texture = Texture::from_image(image);
        texture.source = Some(full);
        Ok(texture)
    }
}
