//! Plain HTTP handlers: health check and RFC 9728 resource metadata.

use axum::extract::State;
use axum::Json;
use plexmcp_core::domain::config::OAuthSettings;
use serde::Serialize;
use tracing::{debug, info};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Server] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Shared state for the metadata endpoints.
#[derive(Clone)]
pub struct MetadataState {
    resource: String,
    authorization_servers: Vec<String>,
}

impl MetadataState {
    pub fn new(oauth: &OAuthSettings) -> Self {
        Self {
            resource: oauth.resource(),
            authorization_servers: vec![oauth.issuer.as_str().trim_end_matches('/').to_string()],
        }
    }
}

/// OAuth Protected Resource Metadata (RFC 9728)
#[derive(Serialize)]
pub struct ProtectedResourceMetadata {
    pub resource: String,
    pub authorization_servers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,
}

/// Protected resource metadata endpoint (RFC 9728). Tells MCP clients where
/// to find the authorization server.
pub async fn resource_metadata(State(state): State<MetadataState>) -> Json<ProtectedResourceMetadata> {
    info!("[Server] Protected resource metadata request");
    Json(ProtectedResourceMetadata {
        resource: state.resource.clone(),
        authorization_servers: state.authorization_servers.clone(),
        scopes_supported: None,
    })
}
