//! Window management using winit.

use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes};

use stage_core::{Error, Result};

use crate::viewport::Viewport;

/// A winit window used as the harness viewport.
///
/// The client size is read from the window on every query, so the harness
/// always sees the size the platform reports at resize time.
pub struct Window {
    window: Arc<WinitWindow>,
}

impl Window {
    /// Create a new window with the given dimensions and title.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| Error::Window(e.to_string()))?;

        tracing::info!("Window created: {}x{}", width, height);

        Ok(Self {
            window: Arc::new(window),
        })
    }

    /// Get a reference to the underlying winit window.
    pub fn inner(&self) -> &WinitWindow {
        &self.window
    }

    /// Shared ownership of the winit window, for surfaces that outlive a borrow.
    pub fn shared(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    /// A second handle to the same window, for use as a [`Viewport`].
    pub fn handle(&self) -> Self {
        Self {
            window: Arc::clone(&self.window),
        }
    }

    /// Request a redraw of the window.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

impl Viewport for Window {
    fn client_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }
}
