//! One-shot readiness signal for a match's round content.

use std::time::Duration;

use tokio::sync::watch;

use crate::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Pending,
    Ready,
    /// Prefetch gave up; carries the last upstream error
    Failed(String),
}

/// Released exactly once, to either `Ready` or `Failed`. Later releases are
/// ignored. Any number of tasks may wait on it.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<Readiness>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Readiness::Pending);
        Self { tx }
    }

    /// Returns `true` if this call performed the release.
    pub fn release_ready(&self) -> bool {
        self.release(Readiness::Ready)
    }

    pub fn release_failed(&self, detail: impl Into<String>) -> bool {
        self.release(Readiness::Failed(detail.into()))
    }

    fn release(&self, outcome: Readiness) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == Readiness::Pending {
                *current = outcome;
                true
            } else {
                false
            }
        })
    }

    pub fn status(&self) -> Readiness {
        self.tx.borrow().clone()
    }

    /// Wait until released, at most `timeout`.
    pub async fn wait(&self, timeout: Duration) -> Result<(), DomainError> {
        let mut rx = self.tx.subscribe();
        let released = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| *state != Readiness::Pending),
        )
        .await;

        let outcome = match released {
            Ok(Ok(state)) => state.clone(),
            // the sender lives in `self`, so the channel cannot close while we wait
            Ok(Err(_)) | Err(_) => return Err(DomainError::InitializationTimeout),
        };

        match outcome {
            Readiness::Ready => Ok(()),
            Readiness::Failed(detail) => Err(DomainError::UpstreamContentFailure(detail)),
            Readiness::Pending => Err(DomainError::InitializationTimeout),
        }
    }
}
