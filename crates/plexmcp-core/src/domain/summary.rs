//! Response shaping: compact, serializable summaries per entity kind.
//!
//! Raw Plex metadata is verbose and uneven. Each entity kind gets one summary
//! struct and one mapping function; list formatting maps items individually so
//! a single malformed entry is skipped instead of failing the whole response.

use serde::Serialize;

use crate::plex::types::{Directory, Metadata, PlayerClient};

/// Plot summaries are truncated to this many characters in list output.
const BRIEF_LEN: usize = 280;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("{kind} entry is missing required field '{field}'")]
    MissingField { kind: String, field: &'static str },
    #[error("entry has unrecognized type '{0}'")]
    UnknownKind(String),
}

impl From<FormatError> for crate::domain::error::PlexError {
    fn from(err: FormatError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A single summarized media item, tagged by entity kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaSummary {
    Movie(MovieSummary),
    Show(ShowSummary),
    Season(SeasonSummary),
    Episode(EpisodeSummary),
    Artist(ArtistSummary),
    Album(AlbumSummary),
    Track(TrackSummary),
    Playlist(PlaylistSummary),
    Collection(CollectionSummary),
    /// Fallback for kinds without a dedicated mapping (photo, clip, ...).
    Other(MediaItemSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub watched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_episodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_episodes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    pub watched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_type: Option<String>,
    pub smart: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub rating_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaItemSummary {
    pub rating_key: String,
    pub title: String,
    pub media_kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// A library section.
#[derive(Debug, Clone, Serialize)]
pub struct LibrarySummary {
    pub key: String,
    pub title: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub refreshing: bool,
}

/// An active playback session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_offset_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A controllable player client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub name: String,
    pub machine_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// A watch history entry.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntrySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_key: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
}

/// Map one metadata entry to the summary for its kind.
pub fn summarize_item(item: &Metadata) -> Result<MediaSummary, FormatError> {
    let kind = item.item_type.as_deref().unwrap_or("");
    match kind {
        "movie" => Ok(MediaSummary::Movie(summarize_movie(item)?)),
        "show" => Ok(MediaSummary::Show(summarize_show(item)?)),
        "season" => Ok(MediaSummary::Season(summarize_season(item)?)),
        "episode" => Ok(MediaSummary::Episode(summarize_episode(item)?)),
        "artist" => Ok(MediaSummary::Artist(summarize_artist(item)?)),
        "album" => Ok(MediaSummary::Album(summarize_album(item)?)),
        "track" => Ok(MediaSummary::Track(summarize_track(item)?)),
        "playlist" => Ok(MediaSummary::Playlist(summarize_playlist(item)?)),
        "collection" => Ok(MediaSummary::Collection(summarize_collection(item)?)),
        "" => Err(FormatError::UnknownKind("(none)".into())),
        other => Ok(MediaSummary::Other(MediaItemSummary {
            rating_key: require(item, other, item.rating_key.as_ref(), "ratingKey")?,
            title: require(item, other, item.title.as_ref(), "title")?,
            media_kind: other.to_string(),
            year: item.year,
        })),
    }
}

/// Map a whole listing, skipping entries that fail to format. Returns the
/// summaries and one message per skipped entry.
pub fn summarize_all(items: &[Metadata]) -> (Vec<MediaSummary>, Vec<String>) {
    let mut out = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    for item in items {
        match summarize_item(item) {
            Ok(summary) => out.push(summary),
            Err(err) => {
                tracing::warn!("[Format] Skipping malformed entry: {err}");
                skipped.push(err.to_string());
            }
        }
    }
    (out, skipped)
}

pub fn summarize_movie(item: &Metadata) -> Result<MovieSummary, FormatError> {
    Ok(MovieSummary {
        rating_key: require(item, "movie", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "movie", item.title.as_ref(), "title")?,
        year: item.year,
        duration_minutes: item.duration.map(minutes),
        rating: item.rating.or(item.audience_rating),
        content_rating: item.content_rating.clone(),
        studio: item.studio.clone(),
        genres: tag_names(&item.genres),
        watched: watched(item),
        added_at: item.added_at.and_then(date),
        summary: item.summary.as_deref().map(brief),
    })
}

pub fn summarize_show(item: &Metadata) -> Result<ShowSummary, FormatError> {
    Ok(ShowSummary {
        rating_key: require(item, "show", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "show", item.title.as_ref(), "title")?,
        year: item.year,
        seasons: item.child_count,
        episodes: item.leaf_count,
        watched_episodes: item.viewed_leaf_count,
        rating: item.rating.or(item.audience_rating),
        content_rating: item.content_rating.clone(),
        studio: item.studio.clone(),
        genres: tag_names(&item.genres),
        summary: item.summary.as_deref().map(brief),
    })
}

pub fn summarize_season(item: &Metadata) -> Result<SeasonSummary, FormatError> {
    Ok(SeasonSummary {
        rating_key: require(item, "season", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "season", item.title.as_ref(), "title")?,
        show: item.parent_title.clone(),
        season_number: item.index,
        episodes: item.leaf_count,
        watched_episodes: item.viewed_leaf_count,
    })
}

pub fn summarize_episode(item: &Metadata) -> Result<EpisodeSummary, FormatError> {
    Ok(EpisodeSummary {
        rating_key: require(item, "episode", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "episode", item.title.as_ref(), "title")?,
        show: item.grandparent_title.clone(),
        season_number: item.parent_index,
        episode_number: item.index,
        duration_minutes: item.duration.map(minutes),
        air_date: item.originally_available_at.clone(),
        watched: watched(item),
        summary: item.summary.as_deref().map(brief),
    })
}

pub fn summarize_artist(item: &Metadata) -> Result<ArtistSummary, FormatError> {
    Ok(ArtistSummary {
        rating_key: require(item, "artist", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "artist", item.title.as_ref(), "title")?,
        genres: tag_names(&item.genres),
        summary: item.summary.as_deref().map(brief),
    })
}

pub fn summarize_album(item: &Metadata) -> Result<AlbumSummary, FormatError> {
    Ok(AlbumSummary {
        rating_key: require(item, "album", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "album", item.title.as_ref(), "title")?,
        artist: item.parent_title.clone(),
        year: item.year,
        tracks: item.leaf_count,
        genres: tag_names(&item.genres),
    })
}

pub fn summarize_track(item: &Metadata) -> Result<TrackSummary, FormatError> {
    Ok(TrackSummary {
        rating_key: require(item, "track", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "track", item.title.as_ref(), "title")?,
        artist: item.grandparent_title.clone(),
        album: item.parent_title.clone(),
        track_number: item.index,
        duration_minutes: item.duration.map(minutes),
    })
}

pub fn summarize_playlist(item: &Metadata) -> Result<PlaylistSummary, FormatError> {
    Ok(PlaylistSummary {
        rating_key: require(item, "playlist", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "playlist", item.title.as_ref(), "title")?,
        playlist_type: item.playlist_type.clone(),
        smart: item.smart.unwrap_or(false),
        items: item.leaf_count,
        duration_minutes: item.duration.map(minutes),
    })
}

pub fn summarize_collection(item: &Metadata) -> Result<CollectionSummary, FormatError> {
    Ok(CollectionSummary {
        rating_key: require(item, "collection", item.rating_key.as_ref(), "ratingKey")?,
        title: require(item, "collection", item.title.as_ref(), "title")?,
        items: item.child_count.or(item.leaf_count),
        summary: item.summary.as_deref().map(brief),
    })
}

pub fn summarize_library(section: &Directory) -> Result<LibrarySummary, FormatError> {
    let key = section
        .key
        .clone()
        .ok_or(FormatError::MissingField { kind: "library".into(), field: "key" })?;
    let title = section
        .title
        .clone()
        .ok_or(FormatError::MissingField { kind: "library".into(), field: "title" })?;
    Ok(LibrarySummary {
        key,
        title,
        kind: section.item_type.clone().unwrap_or_else(|| "unknown".into()),
        agent: section.agent.clone(),
        language: section.language.clone(),
        refreshing: section.refreshing.unwrap_or(false),
    })
}

pub fn summarize_session(item: &Metadata) -> Result<SessionSummary, FormatError> {
    let title = display_title(item)
        .ok_or(FormatError::MissingField { kind: "session".into(), field: "title" })?;
    let progress = match (item.view_offset, item.duration) {
        (Some(offset), Some(total)) if total > 0 => Some((offset * 100) / total),
        _ => None,
    };
    Ok(SessionSummary {
        session_key: item.session_key.clone(),
        session_id: item.session.as_ref().and_then(|s| s.id.clone()),
        title,
        media_kind: item.item_type.clone(),
        user: item.user.as_ref().and_then(|u| u.title.clone()),
        player: item.player.as_ref().and_then(|p| p.title.clone()),
        state: item.player.as_ref().and_then(|p| p.state.clone()),
        progress_percent: progress,
        view_offset_minutes: item.view_offset.map(minutes),
        duration_minutes: item.duration.map(minutes),
        location: item.session.as_ref().and_then(|s| s.location.clone()),
    })
}

pub fn summarize_client(client: &PlayerClient) -> Result<ClientSummary, FormatError> {
    let name = client
        .name
        .clone()
        .ok_or(FormatError::MissingField { kind: "client".into(), field: "name" })?;
    let machine_identifier = client.machine_identifier.clone().ok_or(FormatError::MissingField {
        kind: "client".into(),
        field: "machineIdentifier",
    })?;
    Ok(ClientSummary {
        name,
        machine_identifier,
        product: client.product.clone(),
        version: client.version.clone(),
        address: client.address.clone(),
        port: client.port,
        capabilities: client.capabilities(),
    })
}

pub fn summarize_history_entry(item: &Metadata) -> Result<HistoryEntrySummary, FormatError> {
    let title = display_title(item)
        .ok_or(FormatError::MissingField { kind: "history".into(), field: "title" })?;
    Ok(HistoryEntrySummary {
        rating_key: item.rating_key.clone(),
        title,
        media_kind: item.item_type.clone(),
        viewed_at: item.viewed_at.and_then(date),
        account_id: item.account_id,
    })
}

/// Human-readable display title. Episodes and tracks are prefixed with their
/// show or artist so session and history listings read naturally.
pub fn display_title(item: &Metadata) -> Option<String> {
    let title = item.title.as_deref()?;
    match item.item_type.as_deref() {
        Some("episode") => {
            let show = item.grandparent_title.as_deref().unwrap_or("?");
            match (item.parent_index, item.index) {
                (Some(season), Some(episode)) => {
                    Some(format!("{show} S{season:02}E{episode:02} {title}"))
                }
                _ => Some(format!("{show}: {title}")),
            }
        }
        Some("track") => match item.grandparent_title.as_deref() {
            Some(artist) => Some(format!("{artist}: {title}")),
            None => Some(title.to_string()),
        },
        _ => Some(title.to_string()),
    }
}

fn require(
    item: &Metadata,
    kind: &str,
    value: Option<&String>,
    field: &'static str,
) -> Result<String, FormatError> {
    value.cloned().ok_or_else(|| FormatError::MissingField {
        kind: match item.title.as_deref() {
            Some(title) => format!("{kind} '{title}'"),
            None => kind.to_string(),
        },
        field,
    })
}

fn minutes(ms: i64) -> i64 {
    ms / 60_000
}

fn watched(item: &Metadata) -> bool {
    item.view_count.unwrap_or(0) > 0
}

fn date(epoch: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(epoch, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn tag_names(tags: &[crate::plex::types::Tag]) -> Vec<String> {
    tags.iter().filter_map(|t| t.tag.clone()).collect()
}

fn brief(text: &str) -> String {
    if text.chars().count() <= BRIEF_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(BRIEF_LEN).collect();
    format!("{}...", cut.trim_end())
}
