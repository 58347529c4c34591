use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::regions::RegionSink;
use crate::transport::{FragmentResponse, FragmentTransport};
use crate::types::PollerError;

use super::phase::{
    classify, unexpected_status_message, PollOutcome, PollPhase, ResponseClass,
    CLIENT_UNAVAILABLE_MESSAGE, LOADING_INDICATOR,
};

/// Status reported for requests that never produced a response.
const NO_RESPONSE_STATUS: u16 = 0;

/// State owned by one polling session. Only the session task mutates it.
pub(super) struct PollSession {
    config: PollConfig,
    transport: Arc<dyn FragmentTransport>,
    regions: Arc<dyn RegionSink>,
    phase_tx: watch::Sender<PollPhase>,
    attempts: Arc<AtomicU32>,
}

enum Tick {
    Retry,
    Finished(PollOutcome),
}

impl PollSession {
    pub(super) fn new(
        config: PollConfig,
        transport: Arc<dyn FragmentTransport>,
        regions: Arc<dyn RegionSink>,
        phase_tx: watch::Sender<PollPhase>,
        attempts: Arc<AtomicU32>,
    ) -> Self {
        Self {
            config,
            transport,
            regions,
            phase_tx,
            attempts,
        }
    }

    /// Show the loading indicator and enter the first wait.
    pub(super) fn begin(&self) {
        self.regions
            .set_markup(&self.config.status_region_id, LOADING_INDICATOR);
        self.phase_tx.send_replace(PollPhase::Waiting);
        info!(
            url = %self.config.url,
            method = %self.config.http_method,
            first_delay_ms = self.config.first_delay_ms,
            "Polling session started"
        );
    }

    /// Wait, request, and repeat on 503 until the session reaches a
    /// terminal phase. At most one timer or request is pending at a time.
    pub(super) async fn run(self, mut cancel_rx: watch::Receiver<bool>) -> PollOutcome {
        let mut delay = self.config.first_delay();

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => break self.cancelled_outcome(),
                _ = sleep(delay) => {}
            }

            self.phase_tx.send_replace(PollPhase::InFlight);
            self.attempts.fetch_add(1, Ordering::Relaxed);

            let tick = tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => break self.cancelled_outcome(),
                tick = self.tick() => tick,
            };

            match tick {
                Tick::Retry => {
                    self.phase_tx.send_replace(PollPhase::Waiting);
                    delay = self.config.retry_delay();
                }
                Tick::Finished(outcome) => break outcome,
            }
        };

        self.phase_tx.send_replace(outcome.phase());
        outcome
    }

    async fn tick(&self) -> Tick {
        debug!(url = %self.config.url, attempt = self.attempts(), "Sending fragment request");

        match self
            .transport
            .send(&self.config.http_method, &self.config.url)
            .await
        {
            Ok(response) => self.handle_response(response),
            Err(PollerError::ClientUnavailable(reason)) => {
                warn!(url = %self.config.url, reason = %reason, "HTTP client unavailable");
                self.regions
                    .set_markup(&self.config.status_region_id, CLIENT_UNAVAILABLE_MESSAGE);
                Tick::Finished(PollOutcome::Failed {
                    status: None,
                    message: CLIENT_UNAVAILABLE_MESSAGE.to_string(),
                    attempts: self.attempts(),
                })
            }
            Err(err) => {
                warn!(url = %self.config.url, error = ?err, "Fragment request failed");
                self.fail_with_status(NO_RESPONSE_STATUS)
            }
        }
    }

    fn handle_response(&self, response: FragmentResponse) -> Tick {
        match classify(response.status) {
            ResponseClass::Content => {
                self.regions
                    .set_markup(&self.config.output_region_id, &response.body);
                self.regions.set_markup(&self.config.status_region_id, "");
                info!(
                    url = %self.config.url,
                    status = response.status,
                    attempts = self.attempts(),
                    "Fragment delivered"
                );
                Tick::Finished(PollOutcome::Delivered {
                    status: response.status,
                    attempts: self.attempts(),
                })
            }
            ResponseClass::NotReady => {
                debug!(
                    url = %self.config.url,
                    retry_delay_ms = self.config.retry_delay_ms,
                    "Fragment not ready, retrying"
                );
                Tick::Retry
            }
            ResponseClass::Unexpected => {
                warn!(
                    url = %self.config.url,
                    status = response.status,
                    "Unexpected response status"
                );
                self.fail_with_status(response.status)
            }
        }
    }

    fn fail_with_status(&self, status: u16) -> Tick {
        let message = unexpected_status_message(status);
        self.regions.set_markup(&self.config.status_region_id, &message);
        Tick::Finished(PollOutcome::Failed {
            status: Some(status),
            message,
            attempts: self.attempts(),
        })
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn cancelled_outcome(&self) -> PollOutcome {
        info!(url = %self.config.url, attempts = self.attempts(), "Polling session cancelled");
        PollOutcome::Cancelled {
            attempts: self.attempts(),
        }
    }
}

/// Resolves once cancellation is requested. A dropped handle never cancels.
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
