//! Scene harness.
//!
//! This crate runs one demo at a time:
//! - Frame driver and resize handling
//! - Pending slots for async collaborator results
//! - CPU software renderer and its uniform records
//! - The demo registry

pub mod demo;
pub mod demos;
pub mod depth_buffer;
pub mod frame;
pub mod harness;
pub mod pending;
pub mod render;
pub mod ubo;

pub use demo::{Collaborators, Demo, FrameContext, SetupContext};
pub use depth_buffer::DepthBuffer;
pub use frame::{FrameDriver, FrameOutcome};
pub use harness::Harness;
pub use pending::{Pending, PendingStatus};
pub use render::{FrameStats, Renderer, SoftwareRenderer};
