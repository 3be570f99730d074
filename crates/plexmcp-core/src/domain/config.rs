//! Runtime configuration resolved from the process environment.
//!
//! Connection credentials come in two strategies: a direct base URL plus
//! token, or a plex.tv username/password/server-name triple resolved through
//! account discovery. At least one strategy must be complete before a
//! connection can be established; the check is deferred to connect time so
//! the server can start (and list its tools) without credentials.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::domain::error::PlexError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 32500;
pub const DEFAULT_JWKS_TTL_SECS: u64 = 3600;

/// How the MCP side of the server is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Direct process I/O (the default).
    Stdio,
    /// HTTP server carrying the SSE binding and the Streamable HTTP binding.
    Http,
}

impl TransportKind {
    pub fn parse(value: &str) -> Result<Self, PlexError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "sse" | "streamable-http" => Ok(Self::Http),
            other => Err(PlexError::Configuration(format!(
                "unknown transport '{other}' (expected 'stdio' or 'http')"
            ))),
        }
    }
}

/// Direct connection strategy: talk to one server with a known token.
#[derive(Debug, Clone)]
pub struct DirectCredentials {
    pub base_url: String,
    pub token: String,
}

/// Discovery strategy: sign in to plex.tv and locate the server by name.
/// Without a name, discovery succeeds only when the account has exactly one
/// server.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub username: String,
    pub password: String,
    pub server_name: Option<String>,
}

/// Credentials for the connection manager, in precedence order.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    pub direct: Option<DirectCredentials>,
    pub account: Option<AccountCredentials>,
}

impl ConnectionSettings {
    /// Read `PLEX_URL`/`PLEX_TOKEN` and `PLEX_USERNAME`/`PLEX_PASSWORD`
    /// (plus optional `PLEX_SERVER_NAME`). A partially populated strategy is
    /// treated as absent (and logged), not as an error.
    pub fn from_env() -> Self {
        let url = env_opt("PLEX_URL");
        let token = env_opt("PLEX_TOKEN");
        let direct = match (url, token) {
            (Some(base_url), Some(token)) => Some(DirectCredentials { base_url, token }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "[Config] Ignoring partial direct credentials (need both PLEX_URL and PLEX_TOKEN)"
                );
                None
            }
            (None, None) => None,
        };

        let username = env_opt("PLEX_USERNAME");
        let password = env_opt("PLEX_PASSWORD");
        let server_name = env_opt("PLEX_SERVER_NAME");
        let account = match (username, password) {
            (Some(username), Some(password)) => Some(AccountCredentials {
                username,
                password,
                server_name,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "[Config] Ignoring partial account credentials (need both PLEX_USERNAME and PLEX_PASSWORD)"
                );
                None
            }
        };

        Self { direct, account }
    }

    /// At least one complete strategy is required to connect.
    pub fn validate(&self) -> Result<(), PlexError> {
        if self.direct.is_none() && self.account.is_none() {
            return Err(PlexError::Configuration(
                "no Plex credentials configured: set PLEX_URL and PLEX_TOKEN, \
                 or PLEX_USERNAME and PLEX_PASSWORD (with optional PLEX_SERVER_NAME)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Bind settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
        }
    }
}

impl HttpSettings {
    pub fn addr(&self) -> Result<SocketAddr, PlexError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                PlexError::Configuration(format!(
                    "invalid bind address {}:{}: {e}",
                    self.host, self.port
                ))
            })
    }

    /// Base URL clients on this machine reach the server at.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Bearer validation against an external OIDC issuer.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    /// Issuer base URL; discovery metadata is fetched from its well-known
    /// endpoints.
    pub issuer: Url,
    /// Externally visible URL of this server. Used as the expected token
    /// audience and as the RFC 9728 resource identifier.
    pub public_url: Url,
    /// How long a fetched JWKS document is served from cache.
    pub jwks_ttl: Duration,
}

impl OAuthSettings {
    pub fn resource(&self) -> String {
        self.public_url.as_str().trim_end_matches('/').to_string()
    }
}

/// Fully resolved process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub transport: TransportKind,
    pub http: HttpSettings,
    pub connection: ConnectionSettings,
    pub oauth: Option<OAuthSettings>,
    /// When set, a daily-rolling log file is written here in addition to
    /// stderr output.
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, PlexError> {
        let transport = match env_opt("PLEXMCP_TRANSPORT") {
            Some(value) => TransportKind::parse(&value)?,
            None => TransportKind::Stdio,
        };

        let mut http = HttpSettings::default();
        if let Some(host) = env_opt("PLEXMCP_HOST") {
            http.host = host;
        }
        if let Some(port) = env_opt("PLEXMCP_PORT") {
            http.port = port.parse().map_err(|_| {
                PlexError::Configuration(format!("PLEXMCP_PORT is not a valid port: '{port}'"))
            })?;
        }
        if let Some(cors) = env_opt("PLEXMCP_CORS") {
            http.enable_cors = truthy(&cors);
        }

        let oauth = if env_opt("PLEXMCP_OAUTH_ENABLED").is_some_and(|v| truthy(&v)) {
            Some(oauth_from_env()?)
        } else {
            None
        };

        Ok(Self {
            transport,
            http,
            connection: ConnectionSettings::from_env(),
            oauth,
            log_dir: env_opt("PLEXMCP_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn oauth_from_env() -> Result<OAuthSettings, PlexError> {
    let issuer = require_url("PLEXMCP_OAUTH_ISSUER")?;
    let public_url = require_url("PLEXMCP_PUBLIC_URL")?;
    let jwks_ttl = match env_opt("PLEXMCP_JWKS_TTL_SECS") {
        Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
            PlexError::Configuration(format!(
                "PLEXMCP_JWKS_TTL_SECS is not a valid number of seconds: '{raw}'"
            ))
        })?),
        None => Duration::from_secs(DEFAULT_JWKS_TTL_SECS),
    };
    Ok(OAuthSettings {
        issuer,
        public_url,
        jwks_ttl,
    })
}

fn require_url(name: &str) -> Result<Url, PlexError> {
    let raw = env_opt(name).ok_or_else(|| {
        PlexError::Configuration(format!("{name} is required when PLEXMCP_OAUTH_ENABLED is set"))
    })?;
    Url::parse(&raw)
        .map_err(|e| PlexError::Configuration(format!("{name} is not a valid URL ('{raw}'): {e}")))
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn env_opt(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
