//! Integration tests for texture loading through the retry policy.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};
use stage_resources::{
    AssetLoader, CancellationToken, FileAssetLoader, ResourceError, RetryPolicy,
};

fn write_png(dir: &Path, name: &str) {
    let mut image = RgbaImage::new(4, 2);
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        *pixel = if x < 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        };
    }
    image.save(dir.join(name)).expect("Failed to write fixture PNG");
}

#[test]
fn test_load_png_from_root() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "stripes.png");

    let loader = FileAssetLoader::new(dir.path());
    let texture = loader
        .load_texture(Path::new("stripes.png"))
        .expect("Failed to load PNG texture");

    assert_eq!((texture.width(), texture.height()), (4, 2));
    assert_eq!(texture.source.as_deref(), Some(dir.path().join("stripes.png").as_path()));

    let left = texture.sample(Vec2::new(0.1, 0.5));
    let right = texture.sample(Vec2::new(0.9, 0.5));
    assert!((left - Vec4::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-3);
    assert!((right - Vec4::new(0.0, 0.0, 1.0, 1.0)).length() < 1e-3);
}

#[test]
fn test_corrupt_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

    let loader = FileAssetLoader::new(dir.path());
    let err = loader.load_texture(Path::new("broken.png")).unwrap_err();
    assert!(matches!(err, ResourceError::Decode { .. }), "got {err:?}");
    assert!(!err.is_retryable());
}

#[test]
fn test_policy_wraps_loader() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "1.png");

    let loader: Arc<dyn AssetLoader> = Arc::new(FileAssetLoader::new(dir.path()));
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        backoff_factor: 2.0,
        attempt_timeout: Duration::from_secs(5),
    };

    let ok_loader = loader.clone();
    let texture = policy
        .run("1.png", &CancellationToken::new(), move || {
            ok_loader.load_texture(Path::new("1.png"))
        })
        .unwrap();
    assert_eq!(texture.width(), 4);

    let missing = policy.run("nope.png", &CancellationToken::new(), move || {
        loader.load_texture(Path::new("nope.png"))
    });
    assert!(matches!(missing, Err(ResourceError::FileNotFound(_))));
}
