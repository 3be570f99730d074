//! Server administration and introspection.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::plex::logs::{extract_log, tail, MAIN_LOG_NAME};
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{clamp_limit, ServerLogsParams};

pub async fn list_users(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let accounts = server.accounts().await?;
    let users: Vec<Value> = accounts
        .iter()
        .map(|account| {
            json!({
                "id": account.id,
                "name": account.name,
                "default_audio_language": account.default_audio_language,
            })
        })
        .collect();
    Ok(json!({
        "count": users.len(),
        "users": users,
    }))
}

pub async fn server_info(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let root = server.root().await?;
    Ok(json!({
        "friendly_name": server.friendly_name(),
        "machine_identifier": server.machine_identifier(),
        "version": server.version(),
        "platform": root.platform,
        "platform_version": root.platform_version,
        "plex_pass": root.my_plex,
        "plex_account": root.my_plex_username,
        "active_transcodes": root.transcoder_active_video_sessions,
    }))
}

pub async fn server_logs(
    manager: &ConnectionManager,
    params: ServerLogsParams,
) -> Result<Value, PlexError> {
    let lines = clamp_limit(params.lines, 100, 1000) as usize;
    let server = manager.acquire().await?;
    let bundle = server.download_logs().await?;
    let text = extract_log(&bundle, MAIN_LOG_NAME)?;
    let lines = tail(&text, lines);
    Ok(json!({
        "count": lines.len(),
        "lines": lines,
    }))
}
