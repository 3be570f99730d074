//! plex.tv account sign-in and server resource discovery.
//!
//! Used only when no direct URL and token are configured: exchange the
//! account credentials for a token, list the account's devices, and pick the
//! media server to connect to.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use url::Url;

use crate::domain::error::{Candidate, PlexError};
use crate::plex::client::REQUEST_TIMEOUT;

const PLEX_TV_API: &str = "https://plex.tv/api/v2";
const CLIENT_IDENTIFIER: &str = "plexmcp";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub auth_token: String,
    pub username: Option<String>,
}

/// One device registered to the account. Servers advertise `"server"` in
/// their `provides` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    pub product: Option<String>,
    pub provides: String,
    pub client_identifier: String,
    pub access_token: Option<String>,
    pub owned: Option<bool>,
    #[serde(rename = "connections")]
    pub connections: Vec<ResourceConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceConnection {
    pub uri: String,
    pub protocol: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub local: Option<bool>,
    pub relay: Option<bool>,
}

impl Resource {
    pub fn provides_server(&self) -> bool {
        self.provides.split(',').any(|p| p.trim() == "server")
    }

    /// Connection URIs in preference order: direct endpoints as listed, relay
    /// endpoints last.
    pub fn connection_uris(&self) -> Vec<String> {
        let mut direct = Vec::new();
        let mut relay = Vec::new();
        for conn in &self.connections {
            if conn.uri.is_empty() {
                continue;
            }
            if conn.relay.unwrap_or(false) {
                relay.push(conn.uri.clone());
            } else {
                direct.push(conn.uri.clone());
            }
        }
        direct.extend(relay);
        direct
    }
}

/// Client for the plex.tv v2 API. The base URL is overridable so discovery
/// can be pointed at a test double.
#[derive(Debug, Clone)]
pub struct PlexAccount {
    http: reqwest::Client,
    base_url: Url,
}

impl PlexAccount {
    pub fn new() -> Result<Self, PlexError> {
        let base_url = Url::parse(PLEX_TV_API)
            .map_err(|e| PlexError::Configuration(format!("invalid plex.tv URL: {e}")))?;
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: Url) -> Result<Self, PlexError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Plex-Client-Identifier",
            HeaderValue::from_static(CLIENT_IDENTIFIER),
        );
        headers.insert("X-Plex-Product", HeaderValue::from_static("plexmcp"));
        headers.insert(
            "X-Plex-Version",
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Exchange account credentials for an auth token.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<String, PlexError> {
        let url = self.endpoint("users/signin")?;
        tracing::debug!("[PlexAccount] Signing in as '{username}'");
        let response = self
            .http
            .post(url)
            .form(&[("login", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlexError::Configuration(
                "Plex sign-in rejected: check PLEX_USERNAME and PLEX_PASSWORD".into(),
            ));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlexError::RemoteApi {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    "sign-in failed".into()
                } else {
                    message
                },
            });
        }
        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| PlexError::Decode(format!("unexpected sign-in response: {e}")))?;
        Ok(signed_in.auth_token)
    }

    /// Devices registered to the account, including remote-access endpoints.
    pub async fn resources(&self, token: &str) -> Result<Vec<Resource>, PlexError> {
        let url = self.endpoint("resources")?;
        let response = self
            .http
            .get(url)
            .query(&[("includeHttps", "1"), ("includeRelay", "1")])
            .header("X-Plex-Token", token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlexError::RemoteApi {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    "resource listing failed".into()
                } else {
                    message
                },
            });
        }
        response
            .json::<Vec<Resource>>()
            .await
            .map_err(|e| PlexError::Decode(format!("unexpected resources response: {e}")))
    }

    fn endpoint(&self, path: &str) -> Result<Url, PlexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlexError::Configuration("plex.tv base URL cannot carry paths".into()))?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }
}

/// Pick the media server to use from the account's devices. Without a
/// configured server name this only succeeds when the account has exactly
/// one server; with a name the match is case-insensitive.
pub fn find_server<'a>(
    resources: &'a [Resource],
    server_name: Option<&str>,
) -> Result<&'a Resource, PlexError> {
    let servers: Vec<&Resource> = resources.iter().filter(|r| r.provides_server()).collect();

    let matches: Vec<&Resource> = match server_name {
        Some(name) => servers
            .iter()
            .copied()
            .filter(|r| r.name.eq_ignore_ascii_case(name))
            .collect(),
        None => servers.clone(),
    };

    match matches.len() {
        1 => Ok(matches[0]),
        0 => Err(PlexError::NotFound {
            kind: "server",
            name: server_name.unwrap_or("any").to_string(),
        }),
        _ => Err(PlexError::Ambiguous {
            kind: "server",
            name: server_name.unwrap_or("any").to_string(),
            candidates: matches
                .iter()
                .map(|r| {
                    let candidate = Candidate::new(&r.client_identifier, &r.name);
                    match r.product.as_deref() {
                        Some(product) => candidate.with_detail(product),
                        None => candidate,
                    }
                })
                .collect(),
        }),
    }
}
