//! Media-capture collaborator (live video sources).

use image::{Rgba, RgbaImage};
use stage_core::CaptureConfig;
use tracing::{info, warn};

use crate::error::{ResourceError, ResourceResult};

/// Requested capture resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

impl From<&CaptureConfig> for MediaConstraints {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

/// An open stream of video frames.
pub trait VideoSource: Send {
    /// Frame size in pixels.
    fn size(&self) -> (u32, u32);

    /// The frame to show at `timestamp_ms`.
    fn next_frame(&mut self, timestamp_ms: f64) -> ResourceResult<RgbaImage>;
}

/// Grants access to capture devices.
pub trait MediaCapture: Send + Sync {
    /// Open a video stream honoring `constraints` as closely as possible.
    ///
    /// Fails with [`ResourceError::Unsupported`] when the host has no media
    /// devices and [`ResourceError::PermissionDenied`] when access is refused.
    fn open(&self, constraints: &MediaConstraints) -> ResourceResult<Box<dyn VideoSource>>;
}

/// A host without media devices.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedCapture;

impl MediaCapture for UnsupportedCapture {
    fn open(&self, _constraints: &MediaConstraints) -> ResourceResult<Box<dyn VideoSource>> {
        warn!("Media capture requested but no media devices are available");
        Err(ResourceError::Unsupported("media devices".to_string()))
    }
}

/// Generates a moving color-bar test pattern instead of a camera feed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticCapture;

impl MediaCapture for SyntheticCapture {
    fn open(&self, constraints: &MediaConstraints) -> ResourceResult<Box<dyn VideoSource>> {
        if constraints.width == 0 || constraints.height == 0 {
            return Err(ResourceError::DeviceUnavailable(format!(
                "cannot capture at {}x{}",
                constraints.width, constraints.height
            )));
        }
        info!(
            "Opened synthetic capture at {}x{}",
            constraints.width, constraints.height
        );
        Ok(Box::new(TestPattern {
            width: constraints.width,
            height: constraints.height,
        }))
    }
}

const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

/// Bars scrolling left at one bar width per second.
struct TestPattern {
    width: u32,
    height: u32,
}

impl VideoSource for TestPattern {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self, timestamp_ms: f64) -> ResourceResult<RgbaImage> {
        let bar_width = (self.width as f64 / BARS.len() as f64).max(1.0);
        let shift = timestamp_ms * 0.001 * bar_width;
        Ok(RgbaImage::from_fn(self.width, self.height, |x, _| {
            let bar = ((x as f64 + shift) / bar_width).floor() as i64;
            let [r, g, b] = BARS[bar.rem_euclid(BARS.len() as i64) as usize];
            Rgba([r, g, b, 255])
        }))
    }
}
