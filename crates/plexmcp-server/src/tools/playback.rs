//! Remote playback control operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{
    ControlPlaybackParams, NavigateClientParams, PlayMediaParams, TerminateSessionParams,
};
use super::{resolve, respond};

pub async fn control_playback(
    manager: &ConnectionManager,
    params: ControlPlaybackParams,
) -> Result<Value, PlexError> {
    let command = params.action.command_params(params.offset_ms, params.volume)?;
    let server = manager.acquire().await?;
    let client = resolve::client(&server, &params.client).await?;
    let machine = client
        .machine_identifier
        .as_deref()
        .ok_or_else(|| PlexError::Decode("client has no machine identifier".into()))?;

    server
        .player_command(machine, params.action.command_path(), &command)
        .await?;
    Ok(json!({
        "status": "ok",
        "client": client.name,
        "action": params.action,
    }))
}

pub async fn navigate_client(
    manager: &ConnectionManager,
    params: NavigateClientParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let client = resolve::client(&server, &params.client).await?;
    let machine = client
        .machine_identifier
        .as_deref()
        .ok_or_else(|| PlexError::Decode("client has no machine identifier".into()))?;

    server
        .player_command(machine, params.action.command_path(), &[])
        .await?;
    Ok(json!({
        "status": "ok",
        "client": client.name,
        "action": params.action,
    }))
}

pub async fn play_media(
    manager: &ConnectionManager,
    params: PlayMediaParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let client = resolve::client(&server, &params.client).await?;
    let machine = client
        .machine_identifier
        .as_deref()
        .ok_or_else(|| PlexError::Decode("client has no machine identifier".into()))?;

    let item = match (params.rating_key.as_deref(), params.title.as_deref()) {
        (Some(rating_key), _) => resolve::item_by_key(&server, rating_key).await?,
        (None, Some(title)) => {
            resolve::media_item(&server, title, params.media_type.as_deref()).await?
        }
        (None, None) => {
            return Err(PlexError::Validation(
                "either rating_key or title is required".into(),
            ));
        }
    };
    let rating_key = item
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("item has no rating key".into()))?;

    server
        .play_media(machine, rating_key, params.offset_ms.unwrap_or(0))
        .await?;
    Ok(json!({
        "status": "ok",
        "client": client.name,
        "playing": item.title,
        "rating_key": rating_key,
    }))
}

pub async fn terminate_session(
    manager: &ConnectionManager,
    params: TerminateSessionParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let reason = params
        .reason
        .unwrap_or_else(|| "Stopped by server administrator".to_string());
    server.terminate_session(&params.session_id, &reason).await?;
    Ok(respond::acknowledged(format!(
        "session {} terminated",
        params.session_id
    )))
}
