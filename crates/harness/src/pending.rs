//! Pending→ready slots for collaborator results.
//!
//! A [`Pending`] is created during setup when a demo starts a load. The work
//! runs on a worker thread under a [`RetryPolicy`]; the frame thread polls
//! the slot once per frame and receives the outcome exactly once.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use stage_resources::{CancellationToken, ResourceError, ResourceResult, RetryPolicy};
use tracing::{debug, warn};

/// Where a [`Pending`] slot is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingStatus {
    Loading,
    Ready,
    Failed,
    Cancelled,
}

/// A value that becomes available later.
#[derive(Debug)]
pub struct Pending<T> {
    what: String,
    receiver: Option<Receiver<ResourceResult<T>>>,
    token: CancellationToken,
    status: PendingStatus,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `op` on a worker thread under `policy`.
    pub fn spawn<F>(what: impl Into<String>, policy: RetryPolicy, token: CancellationToken, op: F) -> Self
    where
        F: Fn() -> ResourceResult<T> + Send + Sync + 'static,
    {
        let what = what.into();
        let (tx, rx) = mpsc::channel();
        let worker_token = token.clone();
        let label = what.clone();

        let spawned = thread::Builder::new()
            .name(format!("stage-pending:{what}"))
            .spawn(move || {
                let result = policy.run(&label, &worker_token, op);
                if worker_token.is_cancelled() {
                    debug!("Dropping result for '{}': cancelled", label);
                    return;
                }
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => Self {
                what,
                receiver: Some(rx),
                token,
                status: PendingStatus::Loading,
            },
            Err(e) => {
                warn!("Could not start worker for '{}': {}", what, e);
                Self::settled(what, token, Err(ResourceError::Io(e)))
            }
        }
    }

    /// A slot that already holds `result`; the next poll delivers it.
    pub fn settled(what: impl Into<String>, token: CancellationToken, result: ResourceResult<T>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            what: what.into(),
            receiver: Some(rx),
            token,
            status: PendingStatus::Loading,
        }
    }
}

impl<T> Pending<T> {
    /// Name of the request, for logs.
    pub fn what(&self) -> &str {
        &self.what
    }

    pub fn status(&self) -> PendingStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == PendingStatus::Loading
    }

    /// Check for completion without blocking.
    ///
    /// Returns `Some` exactly once, on the poll that observes the
    /// transition out of `Loading`; `None` before and after.
    pub fn poll(&mut self) -> Option<ResourceResult<T>> {
        let receiver = self.receiver.as_ref()?;

        if self.token.is_cancelled() {
            return Some(self.finish(Err(ResourceError::Cancelled)));
        }

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ResourceError::Io(std::io::Error::other(
                format!("worker for '{}' exited without a result", self.what),
            ))),
        };
        Some(self.finish(result))
    }

    fn finish(&mut self, result: ResourceResult<T>) -> ResourceResult<T> {
        self.receiver = None;
        self.status = match &result {
            Ok(_) => PendingStatus::Ready,
            Err(ResourceError::Cancelled) => PendingStatus::Cancelled,
            Err(_) => PendingStatus::Failed,
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for<T>(pending: &mut Pending<T>) -> ResourceResult<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "pending '{}' never settled", pending.what());
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_ready_delivered_once() {
        let mut pending = Pending::spawn(
            "answer",
            RetryPolicy::once(Duration::from_secs(1)),
            CancellationToken::new(),
            || Ok(42),
        );
        assert_eq!(wait_for(&mut pending).unwrap(), 42);
        assert_eq!(pending.status(), PendingStatus::Ready);
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_failure_is_reported() {
        let mut pending: Pending<()> = Pending::spawn(
            "camera",
            RetryPolicy::once(Duration::from_secs(1)),
            CancellationToken::new(),
            || Err(ResourceError::PermissionDenied("camera".into())),
        );
        assert!(matches!(wait_for(&mut pending), Err(ResourceError::PermissionDenied(_))));
        assert_eq!(pending.status(), PendingStatus::Failed);
    }

    #[test]
    fn test_cancel_while_loading() {
        let token = CancellationToken::new();
        let mut pending = Pending::spawn(
            "slow",
            RetryPolicy::once(Duration::from_secs(5)),
            token.clone(),
            || {
                thread::sleep(Duration::from_millis(200));
                Ok(1)
            },
        );
        assert!(pending.is_loading());
        token.cancel();
        assert!(matches!(pending.poll(), Some(Err(ResourceError::Cancelled))));
        assert_eq!(pending.status(), PendingStatus::Cancelled);
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_settled_slot() {
        let mut pending = Pending::settled("fixed", CancellationToken::new(), Ok("done"));
        assert!(pending.is_loading());
        assert_eq!(pending.poll().unwrap().unwrap(), "done");
        assert!(!pending.is_loading());
    }
}
