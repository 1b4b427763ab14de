//! Frame driver.
//!
//! Turns host timestamps into [`FrameTime`] values. Timestamps that run
//! backwards are clamped so time seen by demos never decreases. Once
//! stopped, the driver yields nothing.

use stage_core::FrameTime;
use tracing::{debug, trace};

/// Result of a single [`Harness::frame`](crate::Harness::frame) call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Resolve, update and draw ran.
    Rendered,
    /// The driver was stopped; nothing ran.
    Stopped,
}

/// Tracks run state and the frame counter.
#[derive(Debug)]
pub struct FrameDriver {
    running: bool,
    last_ms: Option<f64>,
    frame: u64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            running: true,
            last_ms: None,
            frame: 0,
        }
    }

    /// Accept a host timestamp. Returns `None` once stopped.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<FrameTime> {
        if !self.running {
            return None;
        }

        let floor = self.last_ms.unwrap_or(0.0);
        let now = if timestamp_ms.is_finite() && timestamp_ms >= floor {
            timestamp_ms
        } else {
            trace!("Clamping timestamp {} to {}", timestamp_ms, floor);
            floor
        };
        let delta = self.last_ms.map_or(0.0, |last| now - last);

        let time = FrameTime::new(now, delta, self.frame);
        self.last_ms = Some(now);
        self.frame += 1;
        Some(time)
    }

    /// Stop producing frames. Idempotent.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            debug!("Frame driver stopped after {} frames", self.frame);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }
}
