//! Connection lifecycle: lazy connect, freshness tracking, and retries.
//!
//! The manager owns the only cached `PlexServer` handle in the process. Tool
//! operations call [`ConnectionManager::acquire`] at their start and never
//! hold a handle across requests; the shared state sits behind an async mutex
//! so concurrent operations serialize on (re)connection instead of racing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use url::Url;

use crate::domain::config::ConnectionSettings;
use crate::domain::error::PlexError;
use crate::plex::account::{find_server, PlexAccount};
use crate::plex::client::PlexServer;

/// How long an established handle is trusted without revalidation.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(30 * 60);
/// Connection attempts before giving up.
pub const RETRY_ATTEMPTS: u32 = 3;
/// Fixed delay between attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

struct Cached {
    server: Arc<PlexServer>,
    established_at: Instant,
}

pub struct ConnectionManager {
    settings: ConnectionSettings,
    plex_tv_base: Option<Url>,
    freshness_window: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
    state: Mutex<Option<Cached>>,
}

impl ConnectionManager {
    /// A manager with the production freshness and retry policy. No network
    /// traffic happens until the first [`acquire`](Self::acquire).
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            plex_tv_base: None,
            freshness_window: FRESHNESS_WINDOW,
            retry_attempts: RETRY_ATTEMPTS,
            retry_backoff: RETRY_BACKOFF,
            state: Mutex::new(None),
        }
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_retry_policy(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    /// Point account discovery at an alternate plex.tv endpoint.
    pub fn with_plex_tv_base(mut self, base: Url) -> Self {
        self.plex_tv_base = Some(base);
        self
    }

    /// Hand out a server handle, connecting or revalidating as needed.
    ///
    /// A handle younger than the freshness window is returned as-is. An older
    /// one gets a liveness probe first: success re-arms the window, failure
    /// discards the handle and falls through to a full reconnect. In-flight
    /// requests on a discarded handle finish through their own `Arc`.
    pub async fn acquire(&self) -> Result<Arc<PlexServer>, PlexError> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_mut() {
            if cached.established_at.elapsed() < self.freshness_window {
                return Ok(cached.server.clone());
            }
            tracing::debug!("[Connection] Handle is stale, probing before reuse");
            match cached.server.probe().await {
                Ok(()) => {
                    cached.established_at = Instant::now();
                    return Ok(cached.server.clone());
                }
                Err(err) => {
                    tracing::warn!("[Connection] Stale handle failed probe: {err}");
                    *state = None;
                }
            }
        }

        let server = Arc::new(self.connect_with_retry().await?);
        *state = Some(Cached {
            server: server.clone(),
            established_at: Instant::now(),
        });
        Ok(server)
    }

    /// Drop the cached handle so the next acquire reconnects.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            tracing::debug!("[Connection] Cached handle invalidated");
        }
    }

    async fn connect_with_retry(&self) -> Result<PlexServer, PlexError> {
        self.settings.validate()?;

        let mut last_error: Option<PlexError> = None;
        for attempt in 1..=self.retry_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry_backoff).await;
            }
            tracing::debug!(
                "[Connection] Connect attempt {attempt} of {}",
                self.retry_attempts
            );
            match self.connect_once().await {
                Ok(server) => return Ok(server),
                Err(err) if err.is_retryable() => {
                    tracing::warn!("[Connection] Attempt {attempt} failed: {err}");
                    last_error = Some(err);
                }
                // Misconfiguration and selection problems do not improve
                // with retries; surface them immediately.
                Err(err) => return Err(err),
            }
        }

        Err(PlexError::Connection {
            attempts: self.retry_attempts,
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no connection attempt was made".into()),
        })
    }

    async fn connect_once(&self) -> Result<PlexServer, PlexError> {
        if let Some(direct) = &self.settings.direct {
            return PlexServer::connect(&direct.base_url, &direct.token).await;
        }
        let creds = self.settings.account.as_ref().ok_or_else(|| {
            PlexError::Configuration("no Plex connection strategy configured".into())
        })?;

        let account = match &self.plex_tv_base {
            Some(base) => PlexAccount::with_base_url(base.clone())?,
            None => PlexAccount::new()?,
        };
        let token = account.sign_in(&creds.username, &creds.password).await?;
        let resources = account.resources(&token).await?;
        let resource = find_server(&resources, creds.server_name.as_deref())?;
        let access_token = resource.access_token.clone().unwrap_or_else(|| token.clone());

        let mut last_error: Option<PlexError> = None;
        for uri in resource.connection_uris() {
            match PlexServer::connect(&uri, &access_token).await {
                Ok(server) => return Ok(server),
                Err(err) => {
                    tracing::debug!("[Connection] Endpoint {uri} unreachable: {err}");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            PlexError::Decode(format!(
                "server '{}' advertises no connection endpoints",
                resource.name
            ))
        }))
    }
}
