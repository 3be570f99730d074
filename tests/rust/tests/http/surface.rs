//! The unauthenticated HTTP surface.

use std::sync::Arc;

use plexmcp_core::ConnectionManager;
use plexmcp_server::server::build_router;
use serde_json::Value;
use tests::{direct_settings, http_settings, initialize_request, serve_router};
use tokio_util::sync::CancellationToken;

fn open_router() -> axum::Router {
    let settings = http_settings(direct_settings("http://127.0.0.1:1"));
    let manager = Arc::new(ConnectionManager::new(settings.connection.clone()));
    build_router(manager, &settings, CancellationToken::new()).expect("router should build")
}

#[tokio::test]
async fn health_reports_ok_and_the_crate_version() {
    let (base, ct) = serve_router(open_router()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");

    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));
    ct.cancel();
}

#[tokio::test]
async fn well_known_documents_are_absent_without_oauth() {
    let (base, ct) = serve_router(open_router()).await;

    let response = reqwest::get(format!("{base}/.well-known/oauth-protected-resource"))
        .await
        .expect("metadata request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    ct.cancel();
}

#[tokio::test]
async fn the_mcp_endpoint_accepts_initialize_without_a_token() {
    let (base, ct) = serve_router(open_router()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize_request())
        .send()
        .await
        .expect("initialize request");

    assert!(
        response.status().is_success(),
        "unexpected status {}",
        response.status()
    );
    assert!(
        response.headers().get("mcp-session-id").is_some(),
        "stateful transport should assign a session id"
    );
    ct.cancel();
}
