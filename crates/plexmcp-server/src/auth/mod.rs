//! Bearer token validation for the HTTP transport.
//!
//! Tokens are validated against an external OIDC issuer: metadata is fetched
//! from the issuer's `.well-known` endpoints, signing keys from its JWKS
//! document. Keys are cached for the configured TTL; an unknown `kid` forces
//! one refresh to pick up rotated keys.

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use plexmcp_core::domain::config::OAuthSettings;
use plexmcp_core::domain::error::PlexError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

mod middleware;

pub use middleware::{bearer_auth_middleware, AuthState};

/// Why a request failed authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("issuer discovery failed: {0}")]
    Discovery(String),
    #[error("JWKS fetch failed: {0}")]
    Jwks(String),
    #[error("{0}")]
    Token(String),
}

impl AuthError {
    /// RFC 6750 error code for the WWW-Authenticate challenge.
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::Discovery(_) | Self::Jwks(_) => "server_error",
            Self::Token(_) => "invalid_token",
        }
    }
}

/// Authorization server metadata from the issuer's discovery document.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuerMetadata {
    pub issuer: String,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
}

/// Claims carried through to handlers after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Validates bearer tokens against one configured issuer.
pub struct BearerValidator {
    http: reqwest::Client,
    settings: OAuthSettings,
    discovery: OnceCell<IssuerMetadata>,
    jwks: RwLock<Option<CachedJwks>>,
}

impl BearerValidator {
    pub fn new(settings: OAuthSettings) -> Result<Self, PlexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(PlexError::Http)?;
        Ok(Self {
            http,
            settings,
            discovery: OnceCell::new(),
            jwks: RwLock::new(None),
        })
    }

    /// Validate a bearer token: signature against the issuer's JWKS, issuer
    /// against the discovery document, audience against this server's
    /// resource identifier.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::Token(format!("malformed token header: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Token("token header carries no key id".into()))?;

        let jwk = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::Jwks(format!("unusable JWKS key '{kid}': {e}")))?;

        let issuer = self.metadata().await?.issuer.clone();
        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[self.settings.resource()]);
        validation.set_issuer(&[issuer]);

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(map_token_error)
    }

    /// Key lookup by `kid`. A miss forces one refetch since the issuer may
    /// have rotated keys since the cache was filled.
    async fn signing_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.jwks(false).await?;
        if let Some(jwk) = keys.find(kid) {
            return Ok(jwk.clone());
        }
        debug!("[Auth] Key '{kid}' not in cached JWKS, refetching");
        let keys = self.jwks(true).await?;
        keys.find(kid)
            .cloned()
            .ok_or_else(|| AuthError::Token(format!("issuer JWKS has no key '{kid}'")))
    }

    async fn jwks(&self, force: bool) -> Result<JwkSet, AuthError> {
        let ttl = self.settings.jwks_ttl;
        if !force {
            let cached = self.jwks.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < ttl {
                    return Ok(entry.keys.clone());
                }
            }
        }

        let mut slot = self.jwks.write().await;
        // Another task may have refreshed while we waited for the lock.
        if !force {
            if let Some(entry) = slot.as_ref() {
                if entry.fetched_at.elapsed() < ttl {
                    return Ok(entry.keys.clone());
                }
            }
        }

        let metadata = self.metadata().await?;
        let jwks_uri = metadata
            .jwks_uri
            .as_deref()
            .ok_or_else(|| AuthError::Discovery("issuer metadata has no jwks_uri".into()))?;
        let keys: JwkSet = fetch_json(&self.http, jwks_uri)
            .await
            .map_err(AuthError::Jwks)?;
        info!(
            "[Auth] Fetched JWKS from {} ({} keys)",
            jwks_uri,
            keys.keys.len()
        );
        *slot = Some(CachedJwks {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    async fn metadata(&self) -> Result<&IssuerMetadata, AuthError> {
        self.discovery
            .get_or_try_init(|| self.fetch_discovery())
            .await
    }

    /// OIDC discovery with fallback to OAuth Authorization Server metadata.
    async fn fetch_discovery(&self) -> Result<IssuerMetadata, AuthError> {
        let issuer = self.settings.issuer.as_str().trim_end_matches('/');

        let oidc_url = format!("{issuer}/.well-known/openid-configuration");
        debug!("[Auth] Trying OIDC discovery: {oidc_url}");
        match fetch_json::<IssuerMetadata>(&self.http, &oidc_url).await {
            Ok(metadata) => {
                info!("[Auth] OIDC discovery successful for {issuer}");
                return Ok(metadata);
            }
            Err(e) => {
                debug!("[Auth] OIDC discovery failed: {e}, trying OAuth AS metadata");
            }
        }

        let oauth_url = format!("{issuer}/.well-known/oauth-authorization-server");
        debug!("[Auth] Trying OAuth AS discovery: {oauth_url}");
        match fetch_json::<IssuerMetadata>(&self.http, &oauth_url).await {
            Ok(metadata) => {
                info!("[Auth] OAuth AS discovery successful for {issuer}");
                Ok(metadata)
            }
            Err(e) => Err(AuthError::Discovery(format!(
                "no valid metadata at OIDC or OAuth AS endpoints for {issuer}: {e}"
            ))),
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(http: &reqwest::Client, url: &str) -> Result<T, String> {
    let response = http
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}

fn map_token_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    let message = match err.kind() {
        ErrorKind::ExpiredSignature => "token expired".to_string(),
        ErrorKind::InvalidAudience => "token audience does not match this server".to_string(),
        ErrorKind::InvalidIssuer => "token issuer does not match the configured issuer".to_string(),
        ErrorKind::InvalidSignature => "token signature is invalid".to_string(),
        _ => format!("token rejected: {err}"),
    };
    AuthError::Token(message)
}
