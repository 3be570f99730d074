//! Playlist operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::domain::summary::{summarize_all, summarize_playlist};
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{
    AddToPlaylistParams, CreatePlaylistParams, PlaylistParams, RemoveFromPlaylistParams,
};
use super::{resolve, respond};

pub async fn list_playlists(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let playlists = server.playlists().await?;
    let (items, skipped) = respond::shape(&playlists, summarize_playlist);
    Ok(respond::listing(&items, &skipped))
}

pub async fn playlist_items(
    manager: &ConnectionManager,
    params: PlaylistParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let playlist = resolve::playlist(&server, &params.playlist).await?;
    let key = playlist
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("playlist has no rating key".into()))?;

    let container = server.playlist_items(key).await?;
    let (items, skipped) = summarize_all(&container.items);
    let mut payload = respond::listing(&items, &skipped);
    payload["playlist"] = json!(playlist.title);
    Ok(payload)
}

pub async fn create_playlist(
    manager: &ConnectionManager,
    params: CreatePlaylistParams,
) -> Result<Value, PlexError> {
    if params.rating_keys.is_empty() {
        return Err(PlexError::Validation(
            "a playlist needs at least one item".into(),
        ));
    }
    let server = manager.acquire().await?;
    // playlist type follows the first item's kind
    let first = resolve::item_by_key(&server, &params.rating_keys[0]).await?;
    let playlist_type = match first.item_type.as_deref() {
        Some("track") | Some("album") | Some("artist") => "audio",
        Some("photo") => "photo",
        _ => "video",
    };

    let created = server
        .create_playlist(&params.title, playlist_type, &params.rating_keys)
        .await?;
    Ok(json!({
        "status": "ok",
        "playlist": summarize_playlist(&created)?,
    }))
}

pub async fn add_to_playlist(
    manager: &ConnectionManager,
    params: AddToPlaylistParams,
) -> Result<Value, PlexError> {
    if params.rating_keys.is_empty() {
        return Err(PlexError::Validation("no items given to add".into()));
    }
    let server = manager.acquire().await?;
    let playlist = resolve::playlist(&server, &params.playlist).await?;
    let key = playlist
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("playlist has no rating key".into()))?;

    server.add_to_playlist(key, &params.rating_keys).await?;
    Ok(respond::acknowledged(format!(
        "added {} item(s) to '{}'",
        params.rating_keys.len(),
        playlist.title.as_deref().unwrap_or(key)
    )))
}

pub async fn remove_from_playlist(
    manager: &ConnectionManager,
    params: RemoveFromPlaylistParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let playlist = resolve::playlist(&server, &params.playlist).await?;
    let key = playlist
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("playlist has no rating key".into()))?;

    // removal goes by the entry's playlist item id, not the media key
    let container = server.playlist_items(key).await?;
    let entry = container
        .items
        .iter()
        .find(|item| item.rating_key.as_deref() == Some(params.rating_key.as_str()))
        .ok_or_else(|| PlexError::not_found("playlist entry", &params.rating_key))?;
    let item_id = entry.playlist_item_id.ok_or_else(|| {
        PlexError::Decode("playlist entry carries no playlistItemID".into())
    })?;

    server.remove_from_playlist(key, item_id).await?;
    Ok(respond::acknowledged(format!(
        "removed '{}' from '{}'",
        entry.title.as_deref().unwrap_or(&params.rating_key),
        playlist.title.as_deref().unwrap_or(key)
    )))
}

pub async fn delete_playlist(
    manager: &ConnectionManager,
    params: PlaylistParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let playlist = resolve::playlist(&server, &params.playlist).await?;
    let key = playlist
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("playlist has no rating key".into()))?;

    server.delete_playlist(key).await?;
    Ok(respond::acknowledged(format!(
        "playlist '{}' deleted",
        playlist.title.as_deref().unwrap_or(key)
    )))
}
