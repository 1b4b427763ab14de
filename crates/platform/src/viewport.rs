//! The drawing container a harness sizes itself to.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Something with a client area in physical pixels.
pub trait Viewport {
    /// Current client size `(width, height)` in physical pixels.
    ///
    /// Either dimension may be zero while the container is minimised.
    fn client_size(&self) -> (u32, u32);

    /// Ratio of physical to logical pixels.
    fn pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// A viewport whose size is set explicitly.
///
/// Clones share the same size, so a test or headless runner can keep a
/// handle and resize the viewport a harness owns.
#[derive(Clone, Debug)]
pub struct FixedViewport {
    // width in the high 32 bits, height in the low 32 bits
    size: Arc<AtomicU64>,
    pixel_ratio: f64,
}

impl FixedViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Arc::new(AtomicU64::new(pack(width, height))),
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Change the size seen by every clone.
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.store(pack(width, height), Ordering::Relaxed);
    }
}

impl Viewport for FixedViewport {
    fn client_size(&self) -> (u32, u32) {
        unpack(self.size.load(Ordering::Relaxed))
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

impl<V: Viewport + ?Sized> Viewport for Box<V> {
    fn client_size(&self) -> (u32, u32) {
        (**self).client_size()
    }

    fn pixel_ratio(&self) -> f64 {
        (**self).pixel_ratio()
    }
}

fn pack(width: u32, height: u32) -> u64 {
    ((width as u64) << 32) | height as u64
}

fn unpack(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}
