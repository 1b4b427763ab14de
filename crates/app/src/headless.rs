//! Off-screen runner: a fixed-size viewport, a fixed-rate clock, one PNG.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use stage_core::FrameClock;
use stage_harness::{Collaborators, FrameOutcome, Harness, SoftwareRenderer};
use stage_platform::FixedViewport;
use tracing::{debug, info};

const FRAME_RATE: f64 = 60.0;

/// Run `frames` frames of `demo` and write the last one to `out`.
///
/// Frames are paced at the clock's step so loads running on worker threads
/// land on the same frame they would in a window.
pub fn run(demo: &str, size: (u32, u32), frames: u32, out: &Path, collaborators: Collaborators) -> Result<()> {
    let (width, height) = size;
    let mut harness = Harness::for_demo(
        demo,
        FixedViewport::new(width, height),
        SoftwareRenderer::new(width, height),
        collaborators,
    )
    .with_context(|| format!("failed to set up demo '{demo}'"))?;

    let mut clock = FrameClock::fixed_rate(FRAME_RATE);
    let pace = Duration::from_secs_f64(1.0 / FRAME_RATE);
    for _ in 0..frames {
        if harness.frame(clock.now_ms()) == FrameOutcome::Stopped {
            break;
        }
        debug!("Frame stats: {:?}", harness.renderer().stats());
        thread::sleep(pace);
    }
    harness.dispose();

    harness
        .renderer()
        .image()
        .save(out)
        .with_context(|| format!("failed to write snapshot to {}", out.display()))?;
    info!(
        "Wrote {}x{} snapshot of '{}' after {} frames to {}",
        width,
        height,
        demo,
        harness.renderer().frames_drawn(),
        out.display()
    );
    Ok(())
}
