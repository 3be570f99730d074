//! MCP tool surface.
//!
//! One thin `#[tool]` method per operation. Each method hands the shared
//! connection manager and its decoded parameters to the matching category
//! module and funnels the outcome through [`respond::deliver`], so domain
//! failures and ambiguous lookups come back as tool results instead of
//! protocol errors.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::plex::types::type_number;
use plexmcp_core::plex::ConnectionManager;

mod admin;
mod collections;
mod library;
mod metadata;
mod params;
mod playback;
mod playlists;
mod resolve;
mod respond;
mod sessions;

use params::*;

/// Map a caller-supplied media type name to the Plex type number.
pub(crate) fn media_type_number(media_type: &str) -> Result<i32, PlexError> {
    type_number(media_type).ok_or_else(|| {
        PlexError::Validation(format!(
            "unknown media type '{media_type}'; use movie, show, season, episode, \
             artist, album, track, or collection"
        ))
    })
}

#[derive(Clone)]
pub struct PlexMcpServer {
    manager: Arc<ConnectionManager>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PlexMcpServer {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            tool_router: Self::tool_router(),
        }
    }

    // ------------------------------------------------------------------
    // Library
    // ------------------------------------------------------------------

    #[tool(description = "List all libraries (sections) on the Plex server")]
    async fn list_libraries(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(library::list_libraries(&self.manager).await))
    }

    #[tool(
        description = "Item counts per library; TV libraries also report their episode count"
    )]
    async fn get_library_stats(
        &self,
        params: Parameters<LibraryStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::library_stats(&self.manager, params.0).await,
        ))
    }

    #[tool(
        description = "Browse one library's items with optional media type filter, sort order, and paging"
    )]
    async fn browse_library(
        &self,
        params: Parameters<BrowseLibraryParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::browse_library(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Recently added items, across all libraries or within one")]
    async fn get_recently_added(
        &self,
        params: Parameters<RecentlyAddedParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::recently_added(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Continue-watching items: media in progress or next up")]
    async fn get_on_deck(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(library::on_deck(&self.manager).await))
    }

    #[tool(description = "Search all libraries by title, optionally restricted to one media type")]
    async fn search_media(
        &self,
        params: Parameters<SearchMediaParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::search_media(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Full details for one item, addressed by rating key")]
    async fn get_media_details(
        &self,
        params: Parameters<RatingKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::media_details(&self.manager, params.0).await,
        ))
    }

    #[tool(
        description = "Children of an item: a show's seasons, a season's episodes, an album's tracks"
    )]
    async fn get_media_children(
        &self,
        params: Parameters<RatingKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::media_children(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Playback history, optionally filtered by item or by server account")]
    async fn get_watch_history(
        &self,
        params: Parameters<WatchHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::watch_history(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Trigger a scan of one library for new or changed files")]
    async fn scan_library(
        &self,
        params: Parameters<ScanLibraryParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            library::scan_library(&self.manager, params.0).await,
        ))
    }

    // ------------------------------------------------------------------
    // Playback and sessions
    // ------------------------------------------------------------------

    #[tool(description = "Controllable player clients currently connected to the server")]
    async fn list_clients(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(sessions::list_clients(&self.manager).await))
    }

    #[tool(description = "Playback sessions currently active on the server")]
    async fn get_active_sessions(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            sessions::active_sessions(&self.manager).await,
        ))
    }

    #[tool(
        description = "Send a playback command to a client: play, pause, stop, skip, step, seek_to, or set_volume"
    )]
    async fn control_playback(
        &self,
        params: Parameters<ControlPlaybackParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playback::control_playback(&self.manager, params.0).await,
        ))
    }

    #[tool(
        description = "Send a navigation command to a client: directional moves, select, back, or home"
    )]
    async fn navigate_client(
        &self,
        params: Parameters<NavigateClientParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playback::navigate_client(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Start playback of an item on a client, by rating key or by title")]
    async fn play_media(
        &self,
        params: Parameters<PlayMediaParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playback::play_media(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Stop an active playback session, showing the viewer a message")]
    async fn terminate_session(
        &self,
        params: Parameters<TerminateSessionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playback::terminate_session(&self.manager, params.0).await,
        ))
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    #[tool(
        description = "Edit an item's metadata fields and genre tags; edited fields are locked against agent refreshes"
    )]
    async fn edit_metadata(
        &self,
        params: Parameters<EditMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            metadata::edit_metadata(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Set the user rating (0 to 10) on an item")]
    async fn rate_media(
        &self,
        params: Parameters<RateMediaParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            metadata::rate_media(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Mark an item as watched")]
    async fn mark_watched(
        &self,
        params: Parameters<RatingKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            metadata::mark_watched(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Clear an item's watched state")]
    async fn mark_unwatched(
        &self,
        params: Parameters<RatingKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            metadata::mark_unwatched(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Reload an item's metadata from its agent")]
    async fn refresh_metadata(
        &self,
        params: Parameters<RatingKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            metadata::refresh_metadata(&self.manager, params.0).await,
        ))
    }

    // ------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------

    #[tool(description = "List all playlists on the server")]
    async fn list_playlists(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::list_playlists(&self.manager).await,
        ))
    }

    #[tool(description = "Items of one playlist, addressed by title or rating key")]
    async fn get_playlist_items(
        &self,
        params: Parameters<PlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::playlist_items(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Create a playlist from a list of rating keys")]
    async fn create_playlist(
        &self,
        params: Parameters<CreatePlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::create_playlist(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Append items to an existing playlist")]
    async fn add_to_playlist(
        &self,
        params: Parameters<AddToPlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::add_to_playlist(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Remove one item from a playlist")]
    async fn remove_from_playlist(
        &self,
        params: Parameters<RemoveFromPlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::remove_from_playlist(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Delete a playlist")]
    async fn delete_playlist(
        &self,
        params: Parameters<PlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            playlists::delete_playlist(&self.manager, params.0).await,
        ))
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    #[tool(description = "List collections, across all libraries or within one")]
    async fn list_collections(
        &self,
        params: Parameters<ListCollectionsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::list_collections(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Members of one collection, addressed by title or rating key")]
    async fn get_collection_items(
        &self,
        params: Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::collection_items(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Create a collection in a library from a list of rating keys")]
    async fn create_collection(
        &self,
        params: Parameters<CreateCollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::create_collection(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Add items to an existing collection")]
    async fn add_to_collection(
        &self,
        params: Parameters<AddToCollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::add_to_collection(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Remove one item from a collection")]
    async fn remove_from_collection(
        &self,
        params: Parameters<RemoveFromCollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::remove_from_collection(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Delete a collection")]
    async fn delete_collection(
        &self,
        params: Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::delete_collection(&self.manager, params.0).await,
        ))
    }

    #[tool(description = "Edit a collection's title, sort title, or description")]
    async fn edit_collection(
        &self,
        params: Parameters<EditCollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            collections::edit_collection(&self.manager, params.0).await,
        ))
    }

    // ------------------------------------------------------------------
    // Users and server
    // ------------------------------------------------------------------

    #[tool(description = "Accounts known to this Plex server")]
    async fn list_users(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(admin::list_users(&self.manager).await))
    }

    #[tool(description = "Server identity: name, version, platform, and transcoder load")]
    async fn get_server_info(&self) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(admin::server_info(&self.manager).await))
    }

    #[tool(description = "Tail of the main Plex Media Server log")]
    async fn get_server_logs(
        &self,
        params: Parameters<ServerLogsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond::deliver(
            admin::server_logs(&self.manager, params.0).await,
        ))
    }
}

#[tool_handler]
impl ServerHandler for PlexMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Plex Media Server control surface. Browse and search libraries, \
                 control playback on connected clients, manage playlists and \
                 collections, edit metadata, and inspect sessions, users and \
                 server logs. Connection credentials come from the environment: \
                 PLEX_URL and PLEX_TOKEN, or PLEX_USERNAME, PLEX_PASSWORD and \
                 PLEX_SERVER_NAME."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
