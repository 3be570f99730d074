//! Uniform tool response envelopes.
//!
//! Every tool funnels its outcome through [`deliver`]: domain failures become
//! `CallToolResult::error` payloads instead of protocol errors, and ambiguous
//! name lookups become successful disambiguation payloads the caller can
//! resolve by retrying with an id.

use plexmcp_core::domain::error::{Candidate, PlexError};
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::{json, Value};

pub fn deliver(outcome: Result<Value, PlexError>) -> CallToolResult {
    match outcome {
        Ok(payload) => CallToolResult::success(vec![Content::text(render(&payload))]),
        Err(PlexError::Ambiguous {
            kind,
            name,
            candidates,
        }) => ambiguous(kind, &name, &candidates),
        Err(err) => failure(&err),
    }
}

/// Standard list payload: count, items, and the formatting failures (if any).
pub fn listing<T: Serialize>(items: &[T], skipped: &[String]) -> Value {
    let mut payload = json!({
        "count": items.len(),
        "items": items,
    });
    if !skipped.is_empty() {
        payload["skipped"] = json!(skipped);
    }
    payload
}

/// Standard mutation payload.
pub fn acknowledged(message: impl Into<String>) -> Value {
    json!({
        "status": "ok",
        "message": message.into(),
    })
}

/// Shape a listing item by item, collecting failures as messages instead of
/// aborting the whole response.
pub fn shape<I, T, E, F>(source: I, map: F) -> (Vec<T>, Vec<String>)
where
    I: IntoIterator,
    E: std::fmt::Display,
    F: Fn(I::Item) -> Result<T, E>,
{
    let mut items = Vec::new();
    let mut skipped = Vec::new();
    for entry in source {
        match map(entry) {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!("[Tools] Skipping malformed entry: {err}");
                skipped.push(err.to_string());
            }
        }
    }
    (items, skipped)
}

fn ambiguous(kind: &str, name: &str, candidates: &[Candidate]) -> CallToolResult {
    let payload = json!({
        "status": "ambiguous",
        "message": format!(
            "{} {kind} entries match '{name}'; retry with one of the candidate ids",
            candidates.len()
        ),
        "candidates": candidates,
    });
    CallToolResult::success(vec![Content::text(render(&payload))])
}

fn failure(err: &PlexError) -> CallToolResult {
    tracing::debug!("[Tools] Operation failed: {err}");
    let payload = json!({
        "status": "error",
        "kind": err.kind(),
        "message": err.to_string(),
    });
    CallToolResult::error(vec![Content::text(render(&payload))])
}

fn render(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}
