//! Depth buffer management.
//!
//! A CPU depth buffer matching the color surface of the software renderer.
//! Depth values are normalized device depth in `[0, 1]`, nearer is smaller,
//! and the buffer clears to the far plane.

use tracing::debug;

/// Depth value written by [`DepthBuffer::clear`].
pub const FAR_DEPTH: f32 = 1.0;

/// Depth buffer for depth testing.
#[derive(Clone, Debug)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthBuffer {
    /// Create a depth buffer cleared to the far plane.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![FAR_DEPTH; width as usize * height as usize],
        }
    }

    /// Buffer dimensions.
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.values = vec![FAR_DEPTH; width as usize * height as usize];
        debug!("Depth buffer resized to {}x{}", width, height);
    }

    /// Reset every sample to the far plane.
    pub fn clear(&mut self) {
        self.values.fill(FAR_DEPTH);
    }

    /// Stored depth at a pixel.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.values[i])
    }

    /// Less-than depth test. Stores `depth` when it passes and `write` is set.
    pub fn test(&mut self, x: u32, y: u32, depth: f32, write: bool) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if !(0.0..=1.0).contains(&depth) || depth >= self.values[i] {
            return false;
        }
        if write {
            self.values[i] = depth;
        }
        true
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}
