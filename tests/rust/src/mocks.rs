//! Response bodies and token fixtures for the wiremock doubles.
//!
//! Plex endpoints wrap everything in a `MediaContainer` envelope while the
//! plex.tv account API returns bare JSON. Builders here produce the bodies;
//! tests mount them with whatever expectations they care about.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Key id the issuer fixtures publish.
pub const TEST_KID: &str = "integration-key-1";

/// HMAC secret behind [`TEST_KID`].
pub const TEST_SECRET: &[u8] = b"plexmcp-integration-secret";

// =============================================================================
// Plex Media Server bodies
// =============================================================================

/// Wrap a payload in the `MediaContainer` envelope.
pub fn container(inner: Value) -> Value {
    json!({ "MediaContainer": inner })
}

/// Root container identifying the server.
pub fn root_body(friendly_name: &str) -> Value {
    container(json!({
        "size": 0,
        "friendlyName": friendly_name,
        "machineIdentifier": "plex-test-01",
        "version": "1.41.0.8992",
        "platform": "Linux",
        "platformVersion": "6.8",
        "myPlex": true,
        "myPlexUsername": "kara@example.com",
        "transcoderActiveVideoSessions": 0
    }))
}

/// `/library/sections` listing built from `(key, title, type)` triples.
pub fn sections_body(sections: &[(&str, &str, &str)]) -> Value {
    let directories: Vec<Value> = sections
        .iter()
        .map(|(key, title, kind)| {
            json!({
                "key": key,
                "title": title,
                "type": kind,
                "agent": "tv.plex.agents.movie",
                "language": "en-US",
                "refreshing": false
            })
        })
        .collect();
    container(json!({ "size": directories.len(), "Directory": directories }))
}

/// One movie metadata entry.
pub fn movie(rating_key: &str, title: &str, year: i64) -> Value {
    json!({
        "ratingKey": rating_key,
        "key": format!("/library/metadata/{rating_key}"),
        "type": "movie",
        "title": title,
        "year": year,
        "duration": 7_200_000,
        "addedAt": 1_700_000_000
    })
}

/// One collection metadata entry.
pub fn collection(rating_key: &str, title: &str) -> Value {
    json!({
        "ratingKey": rating_key,
        "key": format!("/library/collections/{rating_key}/children"),
        "type": "collection",
        "title": title,
        "childCount": 2
    })
}

/// A container of metadata items.
pub fn items_body(items: Vec<Value>) -> Value {
    container(json!({ "size": items.len(), "Metadata": items }))
}

/// `/hubs/search` response carrying all items in a single movie hub.
pub fn hub_search_body(items: Vec<Value>) -> Value {
    container(json!({
        "size": 1,
        "Hub": [{
            "type": "movie",
            "title": "Movies",
            "size": items.len(),
            "Metadata": items
        }]
    }))
}

// =============================================================================
// plex.tv account bodies
// =============================================================================

/// `POST /users/signin` success body.
pub fn signin_body(auth_token: &str) -> Value {
    json!({ "authToken": auth_token, "username": "kara@example.com" })
}

/// One server entry for the `/resources` listing.
pub fn server_resource(name: &str, access_token: &str, uri: &str) -> Value {
    json!({
        "name": name,
        "product": "Plex Media Server",
        "provides": "server",
        "clientIdentifier": format!("id-{name}"),
        "accessToken": access_token,
        "owned": true,
        "connections": [
            { "uri": uri, "protocol": "http", "local": true, "relay": false }
        ]
    })
}

/// A non-server device, which discovery must skip.
pub fn player_resource(name: &str) -> Value {
    json!({
        "name": name,
        "product": "Plex for Android (TV)",
        "provides": "client,player",
        "clientIdentifier": format!("id-{name}"),
        "connections": []
    })
}

// =============================================================================
// OAuth issuer bodies and tokens
// =============================================================================

/// OIDC discovery document advertising `jwks_uri`.
pub fn discovery_body(issuer: &str, jwks_uri: &str) -> Value {
    json!({
        "issuer": issuer,
        "jwks_uri": jwks_uri,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token")
    })
}

/// JWKS document with a single symmetric key.
pub fn jwks_body(kid: &str, secret: &[u8]) -> Value {
    json!({
        "keys": [{
            "kty": "oct",
            "kid": kid,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(secret)
        }]
    })
}

/// Start an issuer double serving OIDC discovery and a single-key JWKS.
pub async fn start_issuer() -> MockServer {
    let issuer = MockServer::start().await;
    mount_issuer_documents(&issuer, TEST_KID, TEST_SECRET).await;
    issuer
}

/// Mount the discovery and JWKS documents on an issuer double.
pub async fn mount_issuer_documents(issuer: &MockServer, kid: &str, secret: &[u8]) {
    let base = issuer.uri();
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(discovery_body(&base, &format!("{base}/jwks"))),
        )
        .mount(issuer)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body(kid, secret)))
        .mount(issuer)
        .await;
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    sub: &'a str,
    iss: &'a str,
    aud: &'a str,
    exp: u64,
    scope: &'a str,
}

/// Mint an HS256 bearer token under `kid`, expiring `lifetime_secs` from now.
/// Negative lifetimes produce an already expired token.
pub fn mint_token(
    kid: &str,
    secret: &[u8],
    issuer: &str,
    audience: &str,
    lifetime_secs: i64,
) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock should be past the epoch")
        .as_secs() as i64;
    let claims = TokenClaims {
        sub: "user-1",
        iss: issuer,
        aud: audience,
        exp: (now + lifetime_secs).max(0) as u64,
        scope: "mcp",
    };
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(secret))
        .expect("token fixture should encode")
}
