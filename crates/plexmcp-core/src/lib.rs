//! Core library for the Plex MCP server: configuration, the Plex HTTP API
//! client, connection management, and response shaping. Transport and tool
//! wiring live in the server crate.

pub mod domain;
pub mod plex;

pub use domain::config::{ConnectionSettings, Settings, TransportKind};
pub use domain::error::{Candidate, PlexError};
pub use plex::connection::ConnectionManager;
pub use plex::client::PlexServer;
