//! HTTP transport server.
//!
//! One axum router carries both MCP bindings: the SSE transport (`GET /sse`
//! with its `POST /messages/` companion) and the Streamable HTTP transport
//! under `/mcp`. A health endpoint and, when bearer auth is enabled, the RFC
//! 9728 well-known documents sit alongside; the MCP routes themselves are
//! wrapped by the auth middleware in that case.

mod handlers;

pub use handlers::MetadataState;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use plexmcp_core::domain::config::Settings;
use plexmcp_core::domain::error::PlexError;
use plexmcp_core::plex::ConnectionManager;

use crate::auth::{bearer_auth_middleware, AuthState, BearerValidator};
use crate::tools::PlexMcpServer;

/// HTTP server hosting the MCP transports.
pub struct HttpServer {
    settings: Settings,
    manager: Arc<ConnectionManager>,
    ct: CancellationToken,
}

impl HttpServer {
    pub fn new(settings: Settings, manager: Arc<ConnectionManager>) -> Self {
        Self {
            settings,
            manager,
            ct: CancellationToken::new(),
        }
    }

    /// Token that stops the server and its MCP sessions when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.ct.clone()
    }

    /// Bind and serve until cancelled.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.settings.http.addr()?;
        info!("[Server] Starting on {}", addr);
        info!(
            "[Server] CORS: {}",
            if self.settings.http.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );

        let router = build_router(self.manager.clone(), &self.settings, self.ct.clone())?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("[Server] Ready to accept connections");

        let ct = self.ct.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { ct.cancelled().await })
            .await?;
        Ok(())
    }

    /// Start the server in the background.
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Build the full router. Public so tests can drive it without binding a
/// socket.
pub fn build_router(
    manager: Arc<ConnectionManager>,
    settings: &Settings,
    ct: CancellationToken,
) -> Result<Router, PlexError> {
    let addr = settings.http.addr()?;

    // SSE binding: GET /sse for the event stream, POST /messages/ for client
    // requests. The returned router carries both routes.
    let (sse_server, sse_router) = SseServer::new(SseServerConfig {
        bind: addr,
        sse_path: "/sse".to_string(),
        post_path: "/messages/".to_string(),
        ct: ct.child_token(),
        sse_keep_alive: Some(Duration::from_secs(30)),
    });
    sse_server.with_service({
        let manager = manager.clone();
        move || PlexMcpServer::new(manager.clone())
    });

    // Streamable HTTP binding under /mcp, stateful: Mcp-Session-Id headers,
    // GET for server-initiated SSE streams, DELETE for session termination.
    let handler = PlexMcpServer::new(manager);
    let mcp_service = StreamableHttpService::new(
        move || {
            debug!("[Server] Creating handler instance for MCP session");
            Ok(handler.clone())
        },
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(30)),
            sse_retry: Some(Duration::from_secs(3)),
            cancellation_token: ct.child_token(),
        },
    );

    let mut mcp_routes = Router::new()
        .merge(sse_router)
        .nest_service("/mcp", mcp_service);

    let mut router = Router::new().route("/health", get(handlers::health));

    if let Some(oauth) = &settings.oauth {
        let validator = Arc::new(BearerValidator::new(oauth.clone())?);
        let auth_state = AuthState::new(validator, &oauth.resource());
        mcp_routes = mcp_routes.layer(middleware::from_fn_with_state(
            auth_state,
            bearer_auth_middleware,
        ));

        let metadata = MetadataState::new(oauth);
        router = router.merge(wellknown_routes(metadata));
        info!("[Server] Bearer validation enabled (issuer {})", oauth.issuer);
    }

    let mut router = router.merge(mcp_routes).layer(TraceLayer::new_for_http());

    if settings.http.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    Ok(router)
}

/// RFC 9728 documents, including the resource-specific variants clients
/// derive from the transport paths.
fn wellknown_routes(state: MetadataState) -> Router {
    Router::new()
        .route(
            "/.well-known/oauth-protected-resource",
            get(handlers::resource_metadata),
        )
        .route(
            "/.well-known/oauth-protected-resource/mcp",
            get(handlers::resource_metadata),
        )
        .route(
            "/.well-known/oauth-protected-resource/sse",
            get(handlers::resource_metadata),
        )
        .with_state(state)
}
