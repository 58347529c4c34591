use std::process::ExitCode;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use atomic_reload::{Config, FragmentPoller, LogRegions, PollHandle, ReqwestTransport};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().await;
    if config.sessions.is_empty() {
        warn!("No polling sessions configured, nothing to do");
        return ExitCode::SUCCESS;
    }

    let transport = Arc::new(ReqwestTransport::from_config(&config));
    let poller = FragmentPoller::new(transport, Arc::new(LogRegions));

    let handles: Vec<PollHandle> = config
        .sessions
        .iter()
        .cloned()
        .map(|session| poller.start_polling(session))
        .collect();

    let cancellers: Vec<_> = handles.iter().map(PollHandle::canceller).collect();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(sessions = cancellers.len(), "Interrupted, cancelling sessions");
            for canceller in &cancellers {
                canceller.cancel();
            }
        }
    });

    let mut all_delivered = true;
    for (session, handle) in config.sessions.iter().zip(handles) {
        let outcome = handle.finished().await;
        info!(url = %session.url, outcome = ?outcome, "Polling session finished");
        all_delivered &= outcome.is_delivered();
    }

    if all_delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
