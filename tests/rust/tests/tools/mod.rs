//! Tool behavior through the full MCP layer.
//!
//! Each test wires the real tool router to an in-process MCP client over a
//! duplex stream, with a wiremock double standing in for the Plex server.

mod collections;
mod envelopes;
