use std::sync::Arc;

use plexmcp_core::domain::config::{Settings, TransportKind};
use plexmcp_core::plex::ConnectionManager;
use plexmcp_server::logging;
use plexmcp_server::server::HttpServer;
use plexmcp_server::tools::PlexMcpServer;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    let _log_guard = logging::init(settings.log_dir.as_deref());

    info!(
        "[Main] plexmcp {} starting ({:?} transport)",
        env!("CARGO_PKG_VERSION"),
        settings.transport
    );

    let manager = Arc::new(ConnectionManager::new(settings.connection.clone()));

    match settings.transport {
        TransportKind::Stdio => {
            let service = PlexMcpServer::new(manager).serve(stdio()).await?;
            info!("[Main] Serving MCP over stdio");
            service.waiting().await?;
        }
        TransportKind::Http => {
            HttpServer::new(settings, manager).run().await?;
        }
    }

    info!("[Main] Shutting down");
    Ok(())
}
