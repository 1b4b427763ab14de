//! Presents the renderer's color buffer in the window.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use image::{Rgba, RgbaImage};
use softbuffer::{Context, Surface};
use tracing::debug;
use winit::window::Window as WinitWindow;

/// A CPU-side window surface sized to the last presented image.
pub struct Presenter {
    surface: Surface<Arc<WinitWindow>, Arc<WinitWindow>>,
    size: (u32, u32),
}

impl Presenter {
    pub fn new(window: Arc<WinitWindow>) -> Result<Self> {
        let context = Context::new(Arc::clone(&window)).map_err(|e| anyhow!("{e}"))?;
        let surface = Surface::new(&context, window).map_err(|e| anyhow!("{e}"))?;
        Ok(Self { surface, size: (0, 0) })
    }

    /// Copy `image` into the window and flip it on screen.
    pub fn present(&mut self, image: &RgbaImage) -> Result<()> {
        let size = image.dimensions();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.0), NonZeroU32::new(size.1)) else {
            return Ok(());
        };
        if size != self.size {
            self.surface
                .resize(width, height)
                .map_err(|e| anyhow!("{e}"))
                .context("failed to resize window surface")?;
            debug!("Window surface resized to {}x{}", size.0, size.1);
            self.size = size;
        }

        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow!("{e}"))
            .context("failed to map window surface")?;
        for (dst, src) in buffer.iter_mut().zip(image.pixels()) {
            *dst = xrgb(*src);
        }
        buffer
            .present()
            .map_err(|e| anyhow!("{e}"))
            .context("failed to present frame")
    }
}

/// Pack a pixel as `0x00RRGGBB`.
fn xrgb(pixel: Rgba<u8>) -> u32 {
    let [r, g, b, _] = pixel.0;
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xrgb_drops_alpha() {
        assert_eq!(xrgb(Rgba([0x12, 0x34, 0x56, 0x78])), 0x0012_3456);
        assert_eq!(xrgb(Rgba([255, 0, 0, 0])), 0x00ff_0000);
    }
}
