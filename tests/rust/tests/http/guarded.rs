//! Bearer-guarded transports and the RFC 9728 metadata documents.

use std::sync::Arc;

use plexmcp_core::ConnectionManager;
use plexmcp_server::server::build_router;
use serde_json::Value;
use tests::mocks::{self, TEST_KID, TEST_SECRET};
use tests::{direct_settings, http_settings, initialize_request, oauth_settings, serve_router};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

const RESOURCE: &str = "https://plexmcp.example.com";

fn guarded_router(issuer_uri: &str, enable_cors: bool) -> axum::Router {
    let mut settings = http_settings(direct_settings("http://127.0.0.1:1"));
    settings.http.enable_cors = enable_cors;
    settings.oauth = Some(oauth_settings(issuer_uri, RESOURCE));
    let manager = Arc::new(ConnectionManager::new(settings.connection.clone()));
    build_router(manager, &settings, CancellationToken::new()).expect("router should build")
}

fn challenge_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("www-authenticate")
        .and_then(|v| v.to_str().ok())
        .expect("401 should carry a WWW-Authenticate challenge")
        .to_string()
}

#[tokio::test]
async fn requests_without_a_token_get_a_bearer_challenge() {
    // Never contacted: rejection happens before any validation.
    let issuer = MockServer::start().await;
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), false)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize_request())
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let challenge = challenge_of(&response);
    assert!(challenge.contains(r#"Bearer realm="PlexMCP""#), "{challenge}");
    assert!(challenge.contains(r#"error="invalid_token""#), "{challenge}");
    assert!(
        challenge.contains(&format!(
            r#"resource_metadata="{RESOURCE}/.well-known/oauth-protected-resource""#
        )),
        "{challenge}"
    );

    let body: Value = response.json().await.expect("error body");
    assert_eq!(body["error"], "invalid_token");
    assert_eq!(body["error_description"], "Missing access token");
    ct.cancel();
}

#[tokio::test]
async fn malformed_authorization_headers_are_invalid_request() {
    let issuer = MockServer::start().await;
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), false)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .header("Authorization", "Basic a2FyYTpodW50ZXIy")
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize_request())
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let challenge = challenge_of(&response);
    assert!(challenge.contains(r#"error="invalid_request""#), "{challenge}");
    ct.cancel();
}

#[tokio::test]
async fn valid_bearer_tokens_reach_the_mcp_transport() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(TEST_KID, TEST_SECRET, &issuer.uri(), RESOURCE, 3600);
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), false)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .bearer_auth(&token)
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize_request())
        .send()
        .await
        .expect("request");

    assert!(
        response.status().is_success(),
        "unexpected status {}",
        response.status()
    );
    assert!(response.headers().get("mcp-session-id").is_some());
    ct.cancel();
}

#[tokio::test]
async fn expired_tokens_are_rejected_with_a_reason() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(TEST_KID, TEST_SECRET, &issuer.uri(), RESOURCE, -7200);
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), false)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/mcp"))
        .bearer_auth(&token)
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize_request())
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let challenge = challenge_of(&response);
    assert!(
        challenge.contains(r#"error_description="token expired""#),
        "{challenge}"
    );
    ct.cancel();
}

#[tokio::test]
async fn resource_metadata_names_the_issuer() {
    let issuer = MockServer::start().await;
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), false)).await;

    for doc in [
        "/.well-known/oauth-protected-resource",
        "/.well-known/oauth-protected-resource/mcp",
        "/.well-known/oauth-protected-resource/sse",
    ] {
        let body: Value = reqwest::get(format!("{base}{doc}"))
            .await
            .expect("metadata request")
            .json()
            .await
            .expect("metadata body");

        assert_eq!(body["resource"], RESOURCE, "{doc}");
        assert_eq!(body["authorization_servers"][0], issuer.uri(), "{doc}");
    }
    ct.cancel();
}

#[tokio::test]
async fn cors_preflights_skip_authentication() {
    let issuer = MockServer::start().await;
    let (base, ct) = serve_router(guarded_router(&issuer.uri(), true)).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/mcp"))
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("preflight");

    assert_ne!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    ct.cancel();
}
