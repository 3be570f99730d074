//! Token validation outcomes.

use plexmcp_server::auth::BearerValidator;
use pretty_assertions::assert_eq;
use tests::mocks::{self, TEST_KID, TEST_SECRET};
use tests::oauth_settings;
use wiremock::MockServer;

const RESOURCE: &str = "https://plexmcp.example.com";

fn validator_for(issuer: &MockServer) -> BearerValidator {
    BearerValidator::new(oauth_settings(&issuer.uri(), RESOURCE))
        .expect("validator should build")
}

#[tokio::test]
async fn valid_tokens_yield_their_claims() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(TEST_KID, TEST_SECRET, &issuer.uri(), RESOURCE, 3600);

    let claims = validator_for(&issuer)
        .validate(&token)
        .await
        .expect("token should validate");

    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.iss, issuer.uri());
    assert_eq!(claims.scope.as_deref(), Some("mcp"));
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(TEST_KID, TEST_SECRET, &issuer.uri(), RESOURCE, -7200);

    let err = validator_for(&issuer)
        .validate(&token)
        .await
        .expect_err("an expired token must not validate");

    assert_eq!(err.oauth_error_code(), "invalid_token");
    assert_eq!(err.to_string(), "token expired");
}

#[tokio::test]
async fn audience_mismatches_are_rejected() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(
        TEST_KID,
        TEST_SECRET,
        &issuer.uri(),
        "https://other.example.com",
        3600,
    );

    let err = validator_for(&issuer)
        .validate(&token)
        .await
        .expect_err("a token for another resource must not validate");

    assert!(err.to_string().contains("audience"));
}

#[tokio::test]
async fn tokens_signed_with_an_unknown_secret_are_rejected() {
    let issuer = mocks::start_issuer().await;
    let token = mocks::mint_token(TEST_KID, b"some-other-secret", &issuer.uri(), RESOURCE, 3600);

    let err = validator_for(&issuer)
        .validate(&token)
        .await
        .expect_err("a forged signature must not validate");

    assert_eq!(err.to_string(), "token signature is invalid");
}

#[tokio::test]
async fn tokens_without_a_key_id_are_rejected_without_issuer_traffic() {
    // No mounts: any request to the issuer would fail the wiremock default.
    let issuer = MockServer::start().await;
    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
    let claims = serde_json::json!({
        "sub": "user-1",
        "iss": issuer.uri(),
        "aud": RESOURCE,
        "exp": 4_102_444_800u64
    });
    let token = jsonwebtoken::encode(
        &header,
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("token fixture should encode");

    let err = validator_for(&issuer)
        .validate(&token)
        .await
        .expect_err("a token without a kid cannot be checked");

    assert!(err.to_string().contains("key id"));
}

#[tokio::test]
async fn garbage_tokens_are_rejected_as_malformed() {
    let issuer = MockServer::start().await;

    let err = validator_for(&issuer)
        .validate("not-a-jwt")
        .await
        .expect_err("garbage must not validate");

    assert_eq!(err.oauth_error_code(), "invalid_token");
    assert!(err.to_string().contains("malformed token header"));
}
