//! Frame timestamps and the clocks that produce them.

use std::time::Instant;

/// Scale applied to millisecond timestamps to get seconds.
pub const MS_TO_SECONDS: f64 = 0.001;

/// Timing information handed to a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    timestamp_ms: f64,
    delta_ms: f64,
    frame: u64,
}

impl FrameTime {
    /// Create frame timing from a high-resolution timestamp.
    pub fn new(timestamp_ms: f64, delta_ms: f64, frame: u64) -> Self {
        Self {
            timestamp_ms,
            delta_ms,
            frame,
        }
    }

    /// Raw timestamp in milliseconds since the clock started.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Elapsed time in seconds (`timestamp_ms * 0.001`).
    ///
    /// Rotation angles are derived from this value.
    pub fn seconds(&self) -> f32 {
        (self.timestamp_ms * MS_TO_SECONDS) as f32
    }

    /// Time since the previous frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        (self.delta_ms * MS_TO_SECONDS) as f32
    }

    /// Zero-based index of this frame.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[derive(Debug)]
enum Source {
    Realtime(Instant),
    FixedStep { step_ms: f64, next_ms: f64 },
}

/// Source of per-frame timestamps.
///
/// The realtime clock reads a monotonic [`Instant`]; the fixed-step clock
/// advances by a constant interval per sample and is used for headless runs.
#[derive(Debug)]
pub struct FrameClock {
    source: Source,
}

impl FrameClock {
    /// A clock measuring wall time from now.
    pub fn realtime() -> Self {
        Self {
            source: Source::Realtime(Instant::now()),
        }
    }

    /// A clock that yields `0, step, 2*step, ...` milliseconds.
    pub fn fixed_step(step_ms: f64) -> Self {
        Self {
            source: Source::FixedStep {
                step_ms,
                next_ms: 0.0,
            },
        }
    }

    /// A fixed-step clock ticking at `hz` samples per second.
    pub fn fixed_rate(hz: f64) -> Self {
        Self::fixed_step(1000.0 / hz)
    }

    /// Sample the next timestamp in milliseconds.
    pub fn now_ms(&mut self) -> f64 {
        match &mut self.source {
            Source::Realtime(start) => start.elapsed().as_secs_f64() * 1000.0,
            Source::FixedStep { step_ms, next_ms } => {
                let now = *next_ms;
                *next_ms += *step_ms;
                now
            }
        }
    }

    /// Restart the clock from zero.
    pub fn reset(&mut self) {
        match &mut self.source {
            Source::Realtime(start) => *start = Instant::now(),
            Source::FixedStep { next_ms, .. } => *next_ms = 0.0,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::realtime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_seconds_scale() {
        let t = FrameTime::new(2500.0, 16.0, 3);
        assert!((t.seconds() - 2.5).abs() < 1e-6);
        assert!((t.delta_seconds() - 0.016).abs() < 1e-6);
        assert_eq!(t.frame(), 3);
    }

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = FrameClock::fixed_step(10.0);
        assert_eq!(clock.now_ms(), 0.0);
        assert_eq!(clock.now_ms(), 10.0);
        assert_eq!(clock.now_ms(), 20.0);

        clock.reset();
        assert_eq!(clock.now_ms(), 0.0);
    }

    #[test]
    fn test_fixed_rate_clock() {
        let mut clock = FrameClock::fixed_rate(50.0);
        clock.now_ms();
        assert!((clock.now_ms() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_realtime_clock_is_monotonic() {
        let mut clock = FrameClock::realtime();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
