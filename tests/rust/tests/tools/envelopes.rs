//! Error containment at the tool boundary: failures become error payloads
//! inside the result, never protocol errors, and the session survives them.

use std::sync::Arc;
use std::time::Duration;

use plexmcp_core::ConnectionManager;
use plexmcp_server::tools::PlexMcpServer;
use pretty_assertions::assert_eq;
use rmcp::model::CallToolRequestParams;
use rmcp::ServiceExt;
use serde_json::json;
use tests::{args, call_tool, direct_settings, payload_of};

/// A manager whose upstream refuses connections.
fn unreachable_manager() -> Arc<ConnectionManager> {
    Arc::new(
        ConnectionManager::new(direct_settings("http://127.0.0.1:9"))
            .with_retry_policy(1, Duration::ZERO),
    )
}

#[tokio::test]
async fn connection_failures_stay_inside_the_result_envelope() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (server_result, client_result) = tokio::join!(
        PlexMcpServer::new(unreachable_manager()).serve(server_io),
        ().serve(client_io)
    );
    let mut server = server_result.expect("server should start");
    let mut client = client_result.expect("client should connect");

    let result = client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: "get_server_info".into(),
            arguments: None,
            task: None,
        })
        .await
        .expect("the failure must surface as a tool result, not a protocol error");

    assert_eq!(result.is_error, Some(true));
    let payload = payload_of(&result);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["kind"], "connection");
    assert!(payload["message"]
        .as_str()
        .unwrap()
        .contains("could not connect"));

    // The session is still usable after the failed call.
    let tools = client
        .list_tools(Default::default())
        .await
        .expect("listing should still work on the same session");
    assert!(!tools.tools.is_empty());

    client.close().await.expect("client close");
    server.close().await.expect("server close");
}

#[tokio::test]
async fn the_advertised_catalog_is_complete() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (server_result, client_result) = tokio::join!(
        PlexMcpServer::new(unreachable_manager()).serve(server_io),
        ().serve(client_io)
    );
    let mut server = server_result.expect("server should start");
    let mut client = client_result.expect("client should connect");

    let tools = client
        .list_tools(Default::default())
        .await
        .expect("list_tools");

    assert_eq!(tools.tools.len(), 37);
    for expected in [
        "get_on_deck",
        "navigate_client",
        "mark_watched",
        "delete_playlist",
        "edit_collection",
        "list_users",
    ] {
        assert!(
            tools.tools.iter().any(|tool| tool.name.as_ref() == expected),
            "missing tool {expected}"
        );
    }

    client.close().await.expect("client close");
    server.close().await.expect("server close");
}

#[tokio::test]
async fn unknown_media_types_are_validation_errors() {
    let result = call_tool(
        unreachable_manager(),
        "search_media",
        args(json!({ "query": "dune", "media_type": "vinyl" })),
    )
    .await;

    assert_eq!(result.is_error, Some(true));
    let payload = payload_of(&result);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["kind"], "validation");
    assert!(payload["message"].as_str().unwrap().contains("vinyl"));
}

#[tokio::test]
async fn blank_queries_are_rejected_before_any_connection() {
    let result = call_tool(
        unreachable_manager(),
        "search_media",
        args(json!({ "query": "   " })),
    )
    .await;

    assert_eq!(result.is_error, Some(true));
    let payload = payload_of(&result);
    assert_eq!(payload["kind"], "validation");
    assert!(payload["message"].as_str().unwrap().contains("query"));
}
