//! Authenticated handle to a single Plex Media Server.
//!
//! `PlexServer` owns a configured `reqwest` client and exposes one method per
//! consumed endpoint. All responses are requested as JSON and decoded through
//! the `MediaContainer` envelope. Handles are created by the connection
//! manager, never directly by tool code.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::domain::error::PlexError;
use crate::plex::types::{Account, Directory, Envelope, Hub, MediaContainer, Metadata, PlayerClient};

/// Per-request timeout for discrete API calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for the initial reachability probe.
pub const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

const CLIENT_IDENTIFIER: &str = "plexmcp";
const PLEX_PROVIDER: &str = "com.plexapp.plugins.library";

/// An established, authenticated server connection.
pub struct PlexServer {
    http: reqwest::Client,
    base_url: Url,
    friendly_name: String,
    machine_identifier: String,
    version: String,
    command_id: AtomicU64,
}

impl fmt::Debug for PlexServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlexServer")
            .field("base_url", &self.base_url.as_str())
            .field("friendly_name", &self.friendly_name)
            .field("machine_identifier", &self.machine_identifier)
            .field("version", &self.version)
            .finish()
    }
}

impl PlexServer {
    /// Establish a connection: build the HTTP client and fetch the server's
    /// root container to verify the URL and token actually work.
    pub async fn connect(base_url: &str, token: &str) -> Result<Self, PlexError> {
        let base_url = parse_base_url(base_url)?;
        let http = build_http(token)?;
        tracing::debug!("[PlexServer] Probing {}", base_url);

        let response = http
            .get(base_url.clone())
            .timeout(CONNECT_PROBE_TIMEOUT)
            .send()
            .await?;
        let root = decode::<MediaContainer>(check_status(response).await?).await?;

        let server = Self {
            http,
            base_url,
            friendly_name: root.friendly_name.unwrap_or_else(|| "Plex Media Server".into()),
            machine_identifier: root.machine_identifier.unwrap_or_default(),
            version: root.version.unwrap_or_default(),
            command_id: AtomicU64::new(1),
        };
        tracing::info!(
            "[PlexServer] Connected to '{}' ({}) at {}",
            server.friendly_name,
            server.version,
            server.base_url
        );
        Ok(server)
    }

    /// Cheap liveness check against the identity endpoint.
    pub async fn probe(&self) -> Result<(), PlexError> {
        let response = self.request(Method::GET, "/identity")?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn machine_identifier(&self) -> &str {
        &self.machine_identifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Library browsing
    // ------------------------------------------------------------------

    pub async fn sections(&self) -> Result<Vec<Directory>, PlexError> {
        let container = self.get_container("/library/sections", &[]).await?;
        Ok(container.directories)
    }

    /// Items of one section, with optional type filter, sort, and paging.
    pub async fn section_items(
        &self,
        section_key: &str,
        query: &[(String, String)],
    ) -> Result<MediaContainer, PlexError> {
        let path = format!("/library/sections/{}/all", encode(section_key));
        self.get_container(&path, query).await
    }

    pub async fn recently_added(
        &self,
        section_key: Option<&str>,
        limit: u32,
    ) -> Result<MediaContainer, PlexError> {
        let path = match section_key {
            Some(key) => format!("/library/sections/{}/recentlyAdded", encode(key)),
            None => "/library/recentlyAdded".to_string(),
        };
        let query = [("X-Plex-Container-Start".into(), "0".into()),
            ("X-Plex-Container-Size".into(), limit.to_string())];
        self.get_container(&path, &query).await
    }

    pub async fn on_deck(&self) -> Result<MediaContainer, PlexError> {
        self.get_container("/library/onDeck", &[]).await
    }

    /// Grouped search across all libraries via the hub endpoint.
    pub async fn search_hubs(&self, query: &str, limit: u32) -> Result<Vec<Hub>, PlexError> {
        let params = [("query".to_string(), query.to_string()),
            ("limit".to_string(), limit.to_string())];
        let container = self.get_container("/hubs/search", &params).await?;
        Ok(container.hubs)
    }

    pub async fn metadata(&self, rating_key: &str) -> Result<Metadata, PlexError> {
        let path = format!("/library/metadata/{}", encode(rating_key));
        let container = self.get_container(&path, &[]).await?;
        container
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::not_found("item", rating_key))
    }

    pub async fn children(&self, rating_key: &str) -> Result<MediaContainer, PlexError> {
        let path = format!("/library/metadata/{}/children", encode(rating_key));
        self.get_container(&path, &[]).await
    }

    pub async fn history(
        &self,
        query: &[(String, String)],
    ) -> Result<MediaContainer, PlexError> {
        self.get_container("/status/sessions/history/all", query).await
    }

    pub async fn scan_section(&self, section_key: &str) -> Result<(), PlexError> {
        let path = format!("/library/sections/{}/refresh", encode(section_key));
        let response = self.request(Method::GET, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sessions and clients
    // ------------------------------------------------------------------

    pub async fn sessions(&self) -> Result<Vec<Metadata>, PlexError> {
        let container = self.get_container("/status/sessions", &[]).await?;
        Ok(container.items)
    }

    pub async fn clients(&self) -> Result<Vec<PlayerClient>, PlexError> {
        let container = self.get_container("/clients", &[]).await?;
        Ok(container.servers)
    }

    /// Send a remote-control command to a player. Commands are routed through
    /// the server with a monotonically increasing command id, which some
    /// players require to deduplicate.
    pub async fn player_command(
        &self,
        machine_identifier: &str,
        command_path: &str,
        params: &[(String, String)],
    ) -> Result<(), PlexError> {
        let command_id = self.command_id.fetch_add(1, Ordering::Relaxed);
        let path = format!("/player/{command_path}");
        let mut query: Vec<(String, String)> = params.to_vec();
        query.push(("commandID".into(), command_id.to_string()));
        query.push(("type".into(), "video".into()));

        let response = self
            .request(Method::GET, &path)?
            .header("X-Plex-Target-Client-Identifier", machine_identifier)
            .query(&query)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Start playback of a library item on a player.
    pub async fn play_media(
        &self,
        machine_identifier: &str,
        rating_key: &str,
        offset_ms: u64,
    ) -> Result<(), PlexError> {
        let key = format!("/library/metadata/{rating_key}");
        let params = [("key".to_string(), key),
            ("machineIdentifier".to_string(), self.machine_identifier.clone()),
            ("offset".to_string(), offset_ms.to_string()),
            ("address".to_string(), self.base_url.host_str().unwrap_or_default().to_string()),
            ("port".to_string(), self.base_url.port_or_known_default().unwrap_or(32400).to_string()),
            ("protocol".to_string(), self.base_url.scheme().to_string())];
        self.player_command(machine_identifier, "playback/playMedia", &params).await
    }

    pub async fn terminate_session(
        &self,
        session_id: &str,
        reason: &str,
    ) -> Result<(), PlexError> {
        let query = [("sessionId".to_string(), session_id.to_string()),
            ("reason".to_string(), reason.to_string())];
        let response = self
            .request(Method::GET, "/status/sessions/terminate")?
            .query(&query)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata editing
    // ------------------------------------------------------------------

    /// Apply field edits through the section-level edit endpoint. `fields`
    /// holds fully formed parameter names, e.g. `title.value` or
    /// `genre[0].tag.tag`, and each edited field is locked so the next agent
    /// refresh does not overwrite it.
    pub async fn edit_fields(
        &self,
        section_id: i64,
        type_number: i32,
        rating_key: &str,
        fields: &[(String, String)],
    ) -> Result<(), PlexError> {
        let path = format!("/library/sections/{section_id}/all");
        let mut query: Vec<(String, String)> = vec![
            ("type".into(), type_number.to_string()),
            ("id".into(), rating_key.to_string()),
        ];
        query.extend_from_slice(fields);

        let response = self.request(Method::PUT, &path)?.query(&query).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn refresh_metadata(&self, rating_key: &str) -> Result<(), PlexError> {
        let path = format!("/library/metadata/{}/refresh", encode(rating_key));
        let response = self.request(Method::PUT, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn rate(&self, rating_key: &str, rating: f64) -> Result<(), PlexError> {
        let query = [("key".to_string(), rating_key.to_string()),
            ("identifier".to_string(), PLEX_PROVIDER.to_string()),
            ("rating".to_string(), rating.to_string())];
        let response = self.request(Method::GET, "/:/rate")?.query(&query).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn scrobble(&self, rating_key: &str) -> Result<(), PlexError> {
        self.scrobble_endpoint("/:/scrobble", rating_key).await
    }

    pub async fn unscrobble(&self, rating_key: &str) -> Result<(), PlexError> {
        self.scrobble_endpoint("/:/unscrobble", rating_key).await
    }

    async fn scrobble_endpoint(&self, path: &str, rating_key: &str) -> Result<(), PlexError> {
        let query = [("key".to_string(), rating_key.to_string()),
            ("identifier".to_string(), PLEX_PROVIDER.to_string())];
        let response = self.request(Method::GET, path)?.query(&query).send().await?;
        check_status(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------

    pub async fn playlists(&self) -> Result<Vec<Metadata>, PlexError> {
        let container = self.get_container("/playlists", &[]).await?;
        Ok(container.items)
    }

    pub async fn playlist_items(&self, rating_key: &str) -> Result<MediaContainer, PlexError> {
        let path = format!("/playlists/{}/items", encode(rating_key));
        self.get_container(&path, &[]).await
    }

    pub async fn create_playlist(
        &self,
        title: &str,
        playlist_type: &str,
        rating_keys: &[String],
    ) -> Result<Metadata, PlexError> {
        let query = [("title".to_string(), title.to_string()),
            ("type".to_string(), playlist_type.to_string()),
            ("smart".to_string(), "0".to_string()),
            ("uri".to_string(), self.library_uri(rating_keys))];
        let response = self.request(Method::POST, "/playlists")?.query(&query).send().await?;
        let container = decode::<MediaContainer>(check_status(response).await?).await?;
        container
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::Decode("playlist create returned no entry".into()))
    }

    pub async fn add_to_playlist(
        &self,
        playlist_key: &str,
        rating_keys: &[String],
    ) -> Result<(), PlexError> {
        let path = format!("/playlists/{}/items", encode(playlist_key));
        let query = [("uri".to_string(), self.library_uri(rating_keys))];
        let response = self.request(Method::PUT, &path)?.query(&query).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Remove one entry by its playlist item id (not the media rating key).
    pub async fn remove_from_playlist(
        &self,
        playlist_key: &str,
        playlist_item_id: i64,
    ) -> Result<(), PlexError> {
        let path = format!("/playlists/{}/items/{playlist_item_id}", encode(playlist_key));
        let response = self.request(Method::DELETE, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_playlist(&self, playlist_key: &str) -> Result<(), PlexError> {
        let path = format!("/playlists/{}", encode(playlist_key));
        let response = self.request(Method::DELETE, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    pub async fn collections(&self, section_key: &str) -> Result<Vec<Metadata>, PlexError> {
        let path = format!("/library/sections/{}/collections", encode(section_key));
        let container = self.get_container(&path, &[]).await?;
        Ok(container.items)
    }

    pub async fn collection_children(&self, rating_key: &str) -> Result<MediaContainer, PlexError> {
        let path = format!("/library/collections/{}/children", encode(rating_key));
        self.get_container(&path, &[]).await
    }

    pub async fn create_collection(
        &self,
        section_id: i64,
        title: &str,
        type_number: i32,
        rating_keys: &[String],
    ) -> Result<Metadata, PlexError> {
        let query = [("title".to_string(), title.to_string()),
            ("smart".to_string(), "0".to_string()),
            ("sectionId".to_string(), section_id.to_string()),
            ("type".to_string(), type_number.to_string()),
            ("uri".to_string(), self.library_uri(rating_keys))];
        let response = self
            .request(Method::POST, "/library/collections")?
            .query(&query)
            .send()
            .await?;
        let container = decode::<MediaContainer>(check_status(response).await?).await?;
        container
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::Decode("collection create returned no entry".into()))
    }

    pub async fn add_to_collection(
        &self,
        collection_key: &str,
        rating_keys: &[String],
    ) -> Result<(), PlexError> {
        let path = format!("/library/collections/{}/items", encode(collection_key));
        let query = [("uri".to_string(), self.library_uri(rating_keys))];
        let response = self.request(Method::PUT, &path)?.query(&query).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn remove_from_collection(
        &self,
        collection_key: &str,
        rating_key: &str,
    ) -> Result<(), PlexError> {
        let path = format!(
            "/library/collections/{}/items/{}",
            encode(collection_key),
            encode(rating_key)
        );
        let response = self.request(Method::DELETE, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_collection(&self, collection_key: &str) -> Result<(), PlexError> {
        let path = format!("/library/collections/{}", encode(collection_key));
        let response = self.request(Method::DELETE, &path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Server administration
    // ------------------------------------------------------------------

    pub async fn accounts(&self) -> Result<Vec<Account>, PlexError> {
        let container = self.get_container("/accounts", &[]).await?;
        Ok(container.accounts)
    }

    /// The root container, which carries server identity and capability
    /// fields alongside transcoder state.
    pub async fn root(&self) -> Result<MediaContainer, PlexError> {
        self.get_container("/", &[]).await
    }

    /// Download the server's diagnostic log bundle as a zip archive.
    pub async fn download_logs(&self) -> Result<Vec<u8>, PlexError> {
        let response = self.request(Method::GET, "/diagnostics/logs")?.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Provider URI addressing items on this server, as the playlist and
    /// collection endpoints require.
    pub fn library_uri(&self, rating_keys: &[String]) -> String {
        format!(
            "server://{}/{}/library/metadata/{}",
            self.machine_identifier,
            PLEX_PROVIDER,
            rating_keys.join(",")
        )
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, PlexError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| PlexError::Configuration(format!("invalid request path '{path}': {e}")))?;
        Ok(self.http.request(method, url))
    }

    async fn get_container(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<MediaContainer, PlexError> {
        let mut request = self.request(Method::GET, path)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        decode::<MediaContainer>(check_status(response).await?).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, PlexError> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| PlexError::Configuration(format!("invalid Plex URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PlexError::Configuration(format!(
            "unsupported Plex URL scheme '{other}'"
        ))),
    }
}

/// HTTP client with the standard Plex headers baked in.
pub fn build_http(token: &str) -> Result<reqwest::Client, PlexError> {
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
    let mut token_value = HeaderValue::from_str(token)
        .map_err(|_| PlexError::Configuration("Plex token contains invalid characters".into()))?;
    token_value.set_sensitive(true);
    headers.insert("X-Plex-Token", token_value);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(PlexError::Http)
}

/// Promote non-2xx responses to `RemoteApi` errors with a trimmed body.
async fn check_status(response: Response) -> Result<Response, PlexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => truncate_body(&body),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("[PlexServer] Request rejected as unauthorized");
    }
    Err(PlexError::RemoteApi {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, PlexError> {
    let body = response.text().await?;
    serde_json::from_str::<Envelope<T>>(&body)
        .map(|envelope| envelope.media_container)
        .map_err(|e| PlexError::Decode(format!("unexpected Plex response shape: {e}")))
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= LIMIT {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}
