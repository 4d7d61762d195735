//! Probe behavior against a live loopback dev server.
//!
//! These tests run a mock dev server on 127.0.0.1 to exercise the real
//! HTTP path: config probe, client probe, activation, and the offline
//! fallbacks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use devbridge_core::DevServerClient;

/// Global port counter for unique mock server ports.
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19400);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Start a mock dev server on `port` in a background thread.
fn serve_on(port: u16, router: Router) {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();

    thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });

    // Give the server time to start
    thread::sleep(Duration::from_millis(100));
}

async fn serve_config() -> Json<serde_json::Value> {
    Json(json!({
        "base": "/apps/shop",
        "outDir": "dist",
        "srcDir": "src",
        "css": "scss"
    }))
}

fn client_for(port: u16) -> DevServerClient {
    DevServerClient::new("http://127.0.0.1")
        .unwrap()
        .with_port(port)
}

#[test]
fn test_activate_against_live_server() {
    let port = next_port();
    serve_on(
        port,
        Router::new()
            .route("/devbridge.json", get(serve_config))
            .route("/apps/shop/@vite/client", get(|| async { "ok" })),
    );

    let mut client = client_for(port);
    assert!(client.activate());
    assert!(client.is_active());

    let config = client.config().expect("config probe populates the config");
    assert_eq!(config.base, "/apps/shop");
    assert_eq!(config.css_extension, "scss");
    assert_eq!(
        client.base_url(),
        format!("http://127.0.0.1:{port}/apps/shop")
    );
}

#[test]
fn test_failed_config_probe_skips_client_probe() {
    let port = next_port();
    let client_hits = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&client_hits);

    serve_on(
        port,
        Router::new().route(
            "/apps/shop/@vite/client",
            get(move || {
                hits.fetch_add(1, Ordering::SeqCst);
                async { "ok" }
            }),
        ),
    );

    let mut client = client_for(port);
    assert!(!client.activate());
    assert!(!client.is_active());
    assert_eq!(client_hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_client_probe_is_inactive_but_keeps_config() {
    let port = next_port();
    serve_on(
        port,
        Router::new().route("/devbridge.json", get(serve_config)),
    );

    let mut client = client_for(port);
    assert!(!client.activate());
    assert!(!client.is_active());
    // The config probe did succeed; only the client probe failed.
    assert!(client.config().is_some());
}

#[test]
fn test_unusable_config_body_fails_probe() {
    let port = next_port();
    serve_on(
        port,
        Router::new().route("/devbridge.json", get(|| async { "not json" })),
    );

    let mut client = client_for(port);
    assert!(!client.probe_config());
    assert!(client.config().is_none());
}

#[test]
fn test_status_must_be_exactly_200() {
    let port = next_port();
    serve_on(
        port,
        Router::new().route("/devbridge.json", get(|| async { StatusCode::NO_CONTENT })),
    );

    let mut client = client_for(port);
    assert!(!client.activate());
}

#[test]
fn test_offline_server_is_inactive_and_terminal() {
    let port = next_port();

    let mut client = client_for(port);

    // Transport failure is captured, not raised.
    let response = client.request(&client.config_url());
    assert_eq!(response.status, 0);
    assert!(response.error.is_some());

    assert!(!client.activate());

    // A dev server that comes up later does not flip a settled instance.
    serve_on(
        port,
        Router::new()
            .route("/devbridge.json", get(serve_config))
            .route("/apps/shop/@vite/client", get(|| async { "ok" })),
    );
    assert!(!client.activate());
    assert!(!client.is_active());
}
