//! Long-polling of a page fragment into a display region.
//!
//! A session waits, requests the fragment, and keeps retrying while the
//! server answers 503. A 200 or 203 body replaces the output region. Any
//! other status ends the session with an error in the status region.

mod handle;
mod phase;
mod session;
#[cfg(test)]
mod testing;

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::PollConfig;
use crate::regions::RegionSink;
use crate::transport::FragmentTransport;

pub use handle::{PollCanceller, PollHandle};
pub use phase::{
    classify, unexpected_status_message, PollOutcome, PollPhase, ResponseClass,
    CLIENT_UNAVAILABLE_MESSAGE, LOADING_INDICATOR,
};

use session::PollSession;

/// Starts polling sessions that share one transport and one set of regions.
#[derive(Clone)]
pub struct FragmentPoller {
    transport: Arc<dyn FragmentTransport>,
    regions: Arc<dyn RegionSink>,
}

impl FragmentPoller {
    pub fn new(transport: Arc<dyn FragmentTransport>, regions: Arc<dyn RegionSink>) -> Self {
        Self { transport, regions }
    }

    /// Write the loading indicator now and schedule the first request after
    /// `first_delay_ms`. Must be called from within a tokio runtime.
    pub fn start_polling(&self, config: PollConfig) -> PollHandle {
        let (phase_tx, phase_rx) = watch::channel(PollPhase::Idle);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let attempts = Arc::new(AtomicU32::new(0));

        let session = PollSession::new(
            config,
            Arc::clone(&self.transport),
            Arc::clone(&self.regions),
            phase_tx,
            Arc::clone(&attempts),
        );
        session.begin();

        let task = tokio::spawn(session.run(cancel_rx));
        PollHandle::new(phase_rx, cancel_tx, attempts, task)
    }
}
