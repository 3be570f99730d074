use plexmcp_core::domain::action::{NavigationAction, PlaybackAction};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct LibraryStatsParams {
    #[schemars(description = "Library name or section key; omit for all libraries")]
    pub library: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BrowseLibraryParams {
    #[schemars(description = "Library name or section key to browse")]
    pub library: String,
    #[schemars(
        description = "Restrict to one media type: movie, show, season, episode, artist, album, track"
    )]
    pub media_type: Option<String>,
    #[schemars(description = "Sort order: title, added, year, rating, or viewed")]
    pub sort: Option<String>,
    #[schemars(description = "Maximum number of items to return (default 20, max 100)")]
    pub limit: Option<u32>,
    #[schemars(description = "Number of items to skip, for paging")]
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RecentlyAddedParams {
    #[schemars(description = "Library name or section key; omit to span all libraries")]
    pub library: Option<String>,
    #[schemars(description = "Maximum number of items to return (default 20, max 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchMediaParams {
    #[schemars(description = "Title text to search for")]
    pub query: String,
    #[schemars(description = "Restrict results to one media type, e.g. movie or episode")]
    pub media_type: Option<String>,
    #[schemars(description = "Maximum number of results (default 20, max 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RatingKeyParams {
    #[schemars(description = "Rating key identifying the item")]
    pub rating_key: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct WatchHistoryParams {
    #[schemars(description = "Restrict history to one item by rating key")]
    pub rating_key: Option<String>,
    #[schemars(description = "Restrict history to one server account id")]
    pub account_id: Option<i64>,
    #[schemars(description = "Maximum number of entries (default 20, max 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScanLibraryParams {
    #[schemars(description = "Library name or section key to scan for new files")]
    pub library: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ControlPlaybackParams {
    #[schemars(description = "Client name or machine identifier to control")]
    pub client: String,
    #[schemars(description = "Playback command to send")]
    pub action: PlaybackAction,
    #[schemars(description = "Seek position in milliseconds; required for seek_to")]
    pub offset_ms: Option<u64>,
    #[schemars(description = "Volume from 0 to 100; required for set_volume")]
    pub volume: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NavigateClientParams {
    #[schemars(description = "Client name or machine identifier to control")]
    pub client: String,
    #[schemars(description = "Navigation command to send")]
    pub action: NavigationAction,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlayMediaParams {
    #[schemars(description = "Client name or machine identifier to play on")]
    pub client: String,
    #[schemars(description = "Title of the item to play; ignored when rating_key is given")]
    pub title: Option<String>,
    #[schemars(description = "Rating key of the item to play")]
    pub rating_key: Option<String>,
    #[schemars(description = "Disambiguates title lookups: movie, show, episode, track, ...")]
    pub media_type: Option<String>,
    #[schemars(description = "Resume position in milliseconds (default 0)")]
    pub offset_ms: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TerminateSessionParams {
    #[schemars(description = "Session id as reported by get_active_sessions")]
    pub session_id: String,
    #[schemars(description = "Message shown to the interrupted viewer")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditMetadataParams {
    #[schemars(description = "Rating key of the item to edit")]
    pub rating_key: String,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[schemars(description = "New sort title")]
    pub sort_title: Option<String>,
    #[schemars(description = "New plot summary")]
    pub summary: Option<String>,
    #[schemars(description = "New release year")]
    pub year: Option<i32>,
    #[schemars(description = "New content rating, e.g. PG-13")]
    pub content_rating: Option<String>,
    #[schemars(description = "Genre tags to add")]
    pub add_genres: Option<Vec<String>>,
    #[schemars(description = "Genre tags to remove")]
    pub remove_genres: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RateMediaParams {
    #[schemars(description = "Rating key of the item to rate")]
    pub rating_key: String,
    #[schemars(description = "User rating from 0.0 to 10.0")]
    pub rating: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlaylistParams {
    #[schemars(description = "Playlist title or rating key")]
    pub playlist: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePlaylistParams {
    #[schemars(description = "Title of the new playlist")]
    pub title: String,
    #[schemars(description = "Rating keys of the initial items, at least one")]
    pub rating_keys: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddToPlaylistParams {
    #[schemars(description = "Playlist title or rating key")]
    pub playlist: String,
    #[schemars(description = "Rating keys of items to append")]
    pub rating_keys: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveFromPlaylistParams {
    #[schemars(description = "Playlist title or rating key")]
    pub playlist: String,
    #[schemars(description = "Rating key of the item to remove")]
    pub rating_key: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListCollectionsParams {
    #[schemars(description = "Library name or section key; omit for all libraries")]
    pub library: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionParams {
    #[schemars(description = "Collection title or rating key")]
    pub collection: String,
    #[schemars(description = "Library to search; omit to search all libraries")]
    pub library: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCollectionParams {
    #[schemars(description = "Library the collection belongs to")]
    pub library: String,
    #[schemars(description = "Title of the new collection")]
    pub title: String,
    #[schemars(description = "Rating keys of the initial members, at least one")]
    pub rating_keys: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddToCollectionParams {
    #[schemars(description = "Collection title or rating key")]
    pub collection: String,
    #[schemars(description = "Rating keys of items to add")]
    pub rating_keys: Vec<String>,
    #[schemars(description = "Library to search; omit to search all libraries")]
    pub library: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveFromCollectionParams {
    #[schemars(description = "Collection title or rating key")]
    pub collection: String,
    #[schemars(description = "Rating key of the item to remove")]
    pub rating_key: String,
    #[schemars(description = "Library to search; omit to search all libraries")]
    pub library: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditCollectionParams {
    #[schemars(description = "Collection title or rating key")]
    pub collection: String,
    #[schemars(description = "Library to search; omit to search all libraries")]
    pub library: Option<String>,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[schemars(description = "New sort title")]
    pub sort_title: Option<String>,
    #[schemars(description = "New description")]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ServerLogsParams {
    #[schemars(description = "Number of log lines from the end (default 100, max 1000)")]
    pub lines: Option<u32>,
}

/// Clamp a requested page size into `1..=max`, with a default when absent.
pub fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, max)
}
