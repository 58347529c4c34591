//! End-to-end polling against a local HTTP server using the reqwest transport.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use atomic_reload::{
    FragmentPoller, MemoryRegions, PollConfig, PollOutcome, ReqwestTransport,
};

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Answers 503 twice, then the finished report.
async fn slow_report(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, String) {
    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
    if hit < 3 {
        (StatusCode::SERVICE_UNAVAILABLE, "still working".to_string())
    } else {
        (StatusCode::OK, "<p>report ready</p>".to_string())
    }
}

fn app(hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route("/report", get(slow_report))
        .route(
            "/cached",
            get(|| async { (StatusCode::NON_AUTHORITATIVE_INFORMATION, "cached copy") }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/submit", post(|| async { "posted" }))
        .with_state(hits)
}

fn poller(regions: &Arc<MemoryRegions>) -> FragmentPoller {
    let transport = Arc::new(ReqwestTransport::new(
        Some(Duration::from_secs(5)),
        "atomic-reload-test",
    ));
    FragmentPoller::new(transport, regions.clone())
}

fn fast_config(addr: SocketAddr, path: &str) -> PollConfig {
    PollConfig::new("out", "status", format!("http://{addr}{path}"))
        .with_first_delay_ms(10)
        .with_retry_delay_ms(20)
}

#[tokio::test]
async fn test_report_delivered_after_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_server(app(hits.clone())).await;
    let regions = Arc::new(MemoryRegions::new());

    let handle = poller(&regions).start_polling(fast_config(addr, "/report"));
    let outcome = handle.finished().await;

    assert_eq!(
        outcome,
        PollOutcome::Delivered {
            status: 200,
            attempts: 3
        }
    );
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(regions.markup("out").as_deref(), Some("<p>report ready</p>"));
    assert_eq!(regions.markup("status").as_deref(), Some(""));
    assert_eq!(regions.writes_to("out"), 1);
}

#[tokio::test]
async fn test_non_authoritative_body_is_delivered() {
    let addr = spawn_server(app(Arc::new(AtomicUsize::new(0)))).await;
    let regions = Arc::new(MemoryRegions::new());

    let outcome = poller(&regions)
        .start_polling(fast_config(addr, "/cached"))
        .finished()
        .await;

    assert!(outcome.is_delivered());
    assert_eq!(regions.markup("out").as_deref(), Some("cached copy"));
}

#[tokio::test]
async fn test_server_error_reported_in_status_region() {
    let addr = spawn_server(app(Arc::new(AtomicUsize::new(0)))).await;
    let regions = Arc::new(MemoryRegions::new());

    let outcome = poller(&regions)
        .start_polling(fast_config(addr, "/broken"))
        .finished()
        .await;

    assert_eq!(outcome.attempts(), 1);
    assert_eq!(regions.markup("out"), None);
    assert_eq!(
        regions.markup("status").as_deref(),
        Some("[ Dynamic page update failed: Unexpected HTTP response code: 500 ]")
    );
}

#[tokio::test]
async fn test_configured_method_is_used() {
    let addr = spawn_server(app(Arc::new(AtomicUsize::new(0)))).await;
    let regions = Arc::new(MemoryRegions::new());

    let get_outcome = poller(&regions)
        .start_polling(fast_config(addr, "/submit"))
        .finished()
        .await;
    assert!(matches!(
        get_outcome,
        PollOutcome::Failed {
            status: Some(405),
            ..
        }
    ));

    let config = fast_config(addr, "/submit").with_method("POST").unwrap();
    let post_outcome = poller(&regions).start_polling(config).finished().await;
    assert!(post_outcome.is_delivered());
    assert_eq!(regions.markup("out").as_deref(), Some("posted"));
}

#[tokio::test]
async fn test_unreachable_server_fails_with_status_zero() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let regions = Arc::new(MemoryRegions::new());

    let outcome = poller(&regions)
        .start_polling(fast_config(addr, "/report"))
        .finished()
        .await;

    assert!(matches!(outcome, PollOutcome::Failed { status: Some(0), .. }));
    assert_eq!(
        regions.markup("status").as_deref(),
        Some("[ Dynamic page update failed: Unexpected HTTP response code: 0 ]")
    );
}
