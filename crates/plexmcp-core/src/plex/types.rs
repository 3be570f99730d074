//! Wire types for the Plex Media Server HTTP API.
//!
//! Every consumed endpoint honors `Accept: application/json` and wraps its
//! payload in a `MediaContainer` object. Fields are optional wherever the
//! server has been observed to omit them; unknown fields are ignored.

use serde::{Deserialize, Deserializer};

/// Outer JSON envelope: `{"MediaContainer": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaContainer {
    pub size: Option<i64>,
    /// Total result count when pagination headers are in play.
    pub total_size: Option<i64>,
    pub machine_identifier: Option<String>,
    pub friendly_name: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub my_plex: Option<bool>,
    pub my_plex_username: Option<String>,
    pub transcoder_active_video_sessions: Option<i64>,
    #[serde(rename = "Directory")]
    pub directories: Vec<Directory>,
    #[serde(rename = "Metadata")]
    pub items: Vec<Metadata>,
    #[serde(rename = "Server")]
    pub servers: Vec<PlayerClient>,
    #[serde(rename = "Account")]
    pub accounts: Vec<Account>,
    #[serde(rename = "Hub")]
    pub hubs: Vec<Hub>,
}

/// A library section (or any directory-shaped child).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Directory {
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub uuid: Option<String>,
    pub agent: Option<String>,
    pub language: Option<String>,
    pub refreshing: Option<bool>,
}

/// One media item: movie, show, season, episode, artist, album, track,
/// playlist, collection, or an active session (which is an item plus
/// `Player`/`User`/`Session` children).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    pub rating_key: Option<String>,
    pub key: Option<String>,
    pub parent_rating_key: Option<String>,
    pub grandparent_rating_key: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub parent_title: Option<String>,
    pub grandparent_title: Option<String>,
    pub summary: Option<String>,
    pub year: Option<i32>,
    pub index: Option<i64>,
    pub parent_index: Option<i64>,
    pub leaf_count: Option<i64>,
    pub viewed_leaf_count: Option<i64>,
    pub child_count: Option<i64>,
    /// Milliseconds.
    pub duration: Option<i64>,
    /// Milliseconds into playback, on sessions and on-deck items.
    pub view_offset: Option<i64>,
    pub view_count: Option<i64>,
    pub last_viewed_at: Option<i64>,
    pub added_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub originally_available_at: Option<String>,
    pub content_rating: Option<String>,
    pub rating: Option<f64>,
    pub audience_rating: Option<f64>,
    pub user_rating: Option<f64>,
    pub studio: Option<String>,
    pub library_section_id: Option<i64>,
    pub library_section_title: Option<String>,
    pub playlist_type: Option<String>,
    pub smart: Option<bool>,
    /// Identifier of this entry *within* a playlist; distinct from the
    /// item's own rating key and required for removal.
    pub playlist_item_id: Option<i64>,
    /// History entries carry these instead of playback state.
    pub viewed_at: Option<i64>,
    #[serde(rename = "accountID")]
    pub account_id: Option<i64>,
    pub session_key: Option<String>,
    #[serde(rename = "Genre")]
    pub genres: Vec<Tag>,
    #[serde(rename = "Director")]
    pub directors: Vec<Tag>,
    #[serde(rename = "Player")]
    pub player: Option<Player>,
    #[serde(rename = "User")]
    pub user: Option<SessionUser>,
    #[serde(rename = "Session")]
    pub session: Option<SessionInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub tag: Option<String>,
    pub id: Option<i64>,
}

/// Player state attached to an active session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub title: Option<String>,
    pub machine_identifier: Option<String>,
    pub product: Option<String>,
    pub platform: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
}

/// User attached to an active session. The id is a string in some server
/// versions and a number in others.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(deserialize_with = "de::flex_string")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: Option<String>,
    pub bandwidth: Option<i64>,
    pub location: Option<String>,
}

/// A controllable player, as listed by the clients endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerClient {
    pub name: Option<String>,
    pub machine_identifier: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub address: Option<String>,
    pub port: Option<i64>,
    pub device_class: Option<String>,
    /// Comma-separated list, e.g. `"timeline,playback,navigation"`.
    pub protocol_capabilities: Option<String>,
}

impl PlayerClient {
    pub fn capabilities(&self) -> Vec<String> {
        self.protocol_capabilities
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.trim().to_string())
            .collect()
    }
}

/// A server-side user account entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "de::flex_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub thumb: Option<String>,
    pub default_audio_language: Option<String>,
}

/// One hub of grouped search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hub {
    #[serde(rename = "type")]
    pub hub_type: Option<String>,
    pub title: Option<String>,
    pub size: Option<i64>,
    #[serde(rename = "Metadata")]
    pub items: Vec<Metadata>,
}

/// Numeric type codes the edit and collection endpoints expect.
pub fn type_number(kind: &str) -> Option<i32> {
    match kind {
        "movie" => Some(1),
        "show" => Some(2),
        "season" => Some(3),
        "episode" => Some(4),
        "artist" => Some(8),
        "album" => Some(9),
        "track" => Some(10),
        "collection" => Some(18),
        _ => None,
    }
}

mod de {
    use super::*;

    /// Accept a string, a number, or nothing, normalizing to a string.
    pub fn flex_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            S(String),
            I(i64),
            F(f64),
        }
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        Ok(raw.map(|v| match v {
            Raw::S(s) => s,
            Raw::I(i) => i.to_string(),
            Raw::F(f) => f.to_string(),
        }))
    }
}
