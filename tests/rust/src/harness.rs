//! In-process MCP wiring: a client/server pair over a duplex stream for tool
//! calls, and an ephemeral-port axum server for transport-level tests.

use std::sync::Arc;

use plexmcp_core::ConnectionManager;
use plexmcp_server::tools::PlexMcpServer;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Call one tool through the full MCP layer and return its result.
pub async fn call_tool(
    manager: Arc<ConnectionManager>,
    tool_name: &str,
    arguments: Option<serde_json::Map<String, Value>>,
) -> CallToolResult {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);

    let (server_result, client_result) = tokio::join!(
        PlexMcpServer::new(manager).serve(server_io),
        ().serve(client_io)
    );
    let mut server = server_result.expect("server should start over the in-memory transport");
    let mut client = client_result.expect("client should connect over the in-memory transport");

    let result = client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: tool_name.to_owned().into(),
            arguments,
            task: None,
        })
        .await
        .expect("tool call should produce a result");

    client
        .close()
        .await
        .expect("client should close cleanly after the call");
    server
        .close()
        .await
        .expect("server should close cleanly after the call");

    result
}

/// Parse the JSON payload out of a tool result's text content.
pub fn payload_of(result: &CallToolResult) -> Value {
    let text = result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.as_str())
        .expect("tool result should carry text content");
    serde_json::from_str(text).expect("tool text content should be valid JSON")
}

/// Tool arguments from a JSON object literal.
pub fn args(value: Value) -> Option<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => panic!("tool arguments must be a JSON object, got {other}"),
    }
}

/// A well-formed `initialize` request for driving the HTTP transports.
pub fn initialize_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "probe", "version": "0.0.0" }
        }
    })
}

/// Serve a router on an ephemeral port. Returns the base URL and a token that
/// stops the server.
pub async fn serve_router(router: axum::Router) -> (String, CancellationToken) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener
        .local_addr()
        .expect("listener should report its address");

    let ct = CancellationToken::new();
    let shutdown = ct.clone();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .expect("test server should serve until cancelled");
    });

    (format!("http://{addr}"), ct)
}
