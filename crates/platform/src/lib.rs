//! Platform abstraction layer for the stage harness.
//!
//! This crate provides platform-specific functionality:
//! - The [`Viewport`] a harness reads its drawing size from
//! - Window management via winit
//! - Input handling (keyboard, mouse) for camera controls

mod input;
mod viewport;
mod window;

pub use input::{InputState, KeyCode, MouseButton};
pub use viewport::{FixedViewport, Viewport};
pub use window::Window;

// Re-export winit types that users might need
pub use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
pub use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
