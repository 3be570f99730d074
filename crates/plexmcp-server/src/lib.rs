//! MCP server frontend: tool router, transports, logging, and bearer auth.

pub mod auth;
pub mod logging;
pub mod server;
pub mod tools;
