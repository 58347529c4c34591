use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::phase::{PollOutcome, PollPhase};

/// Requests cancellation of one polling session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PollCanceller {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl PollCanceller {
    /// Abort the pending timer or in-flight request. Neither region is
    /// written afterwards. Has no effect once the session has finished.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }
}

/// Handle to a running polling session.
///
/// Dropping the handle leaves the session running until it reaches a
/// terminal phase.
pub struct PollHandle {
    phase_rx: watch::Receiver<PollPhase>,
    canceller: PollCanceller,
    attempts: Arc<AtomicU32>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub(super) fn new(
        phase_rx: watch::Receiver<PollPhase>,
        cancel_tx: watch::Sender<bool>,
        attempts: Arc<AtomicU32>,
        task: JoinHandle<PollOutcome>,
    ) -> Self {
        Self {
            phase_rx,
            canceller: PollCanceller {
                cancel_tx: Arc::new(cancel_tx),
            },
            attempts,
            task,
        }
    }

    pub fn phase(&self) -> PollPhase {
        *self.phase_rx.borrow()
    }

    /// Requests issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> PollCanceller {
        self.canceller.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to reach a terminal phase.
    pub async fn finished(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                let attempts = self.attempts.load(Ordering::Relaxed);
                warn!(error = ?err, attempts, "Polling task ended abnormally");
                PollOutcome::Failed {
                    status: None,
                    message: format!("polling task ended abnormally: {err}"),
                    attempts,
                }
            }
        }
    }
}
