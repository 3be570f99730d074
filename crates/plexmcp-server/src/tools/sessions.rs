//! Session and client introspection operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::domain::summary::{summarize_client, summarize_session};
use plexmcp_core::plex::ConnectionManager;
use serde_json::Value;

use super::respond;

pub async fn list_clients(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let clients = server.clients().await?;
    let (items, skipped) = respond::shape(&clients, summarize_client);
    Ok(respond::listing(&items, &skipped))
}

pub async fn active_sessions(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let sessions = server.sessions().await?;
    let (items, skipped) = respond::shape(&sessions, summarize_session);
    Ok(respond::listing(&items, &skipped))
}
