//! Retry, timeout and cancellation for collaborator calls.
//!
//! Collaborators (asset loaders, media capture) can block for an unknown
//! time. [`RetryPolicy::run`] executes each attempt on its own thread and
//! waits at most `attempt_timeout` for it; retryable failures are repeated
//! with exponential backoff until the attempt budget is spent or the
//! [`CancellationToken`] fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use stage_core::RetryConfig;
use tracing::{debug, warn};

use crate::error::{ResourceError, ResourceResult};

/// Shared flag telling in-flight work to stop.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancelled.
    pub fn check(&self) -> ResourceResult<()> {
        if self.is_cancelled() {
            Err(ResourceError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// How often and how long to try a collaborator call.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_factor: f32,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            backoff_factor: config.backoff_factor.max(1.0),
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn once(attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            backoff_factor: 1.0,
            attempt_timeout,
        }
    }

    /// Delay before attempt number `attempt` (1-based; the first has none).
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = self.backoff_factor.powi(attempt as i32 - 2);
        self.initial_backoff.mul_f32(factor)
    }

    /// Run `op` under this policy.
    ///
    /// `what` names the request in logs and timeout errors. Blocks the
    /// calling thread; callers on the frame thread should run this on a
    /// worker.
    ///
    /// A timed-out attempt is abandoned, not interrupted: its thread stays
    /// detached and runs `op` to completion, and whatever it returns is
    /// dropped. `token` is only checked before and after each attempt, so
    /// an `op` that must stop early has to watch a clone of it.
    pub fn run<T, F>(&self, what: &str, token: &CancellationToken, op: F) -> ResourceResult<T>
    where
        T: Send + 'static,
        F: Fn() -> ResourceResult<T> + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let mut attempt = 1;
        loop {
            token.check()?;
            let result = self.attempt(what, Arc::clone(&op));
            token.check()?;

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "Attempt {}/{} for '{}' failed: {}; retrying in {:?}",
                        attempt - 1,
                        self.max_attempts,
                        what,
                        err,
                        delay
                    );
                    thread::sleep(delay);
                }
                Err(err) => {
                    debug!("Giving up on '{}' after {} attempt(s): {}", what, attempt, err);
                    return Err(err);
                }
            }
        }
    }

    fn attempt<T, F>(&self, what: &str, op: Arc<F>) -> ResourceResult<T>
    where
        T: Send + 'static,
        F: Fn() -> ResourceResult<T> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("stage-load:{what}"))
            .spawn(move || {
                // The receiver is gone once the attempt timed out.
                let _ = tx.send(op());
            })?;

        match rx.recv_timeout(self.attempt_timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ResourceError::Timeout {
                what: what.to_string(),
                after: self.attempt_timeout,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ResourceError::Io(
                std::io::Error::other(format!("loader thread for '{what}' panicked")),
            )),
        }
    }
}
