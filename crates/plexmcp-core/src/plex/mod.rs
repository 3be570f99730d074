//! Plex API surface: the authenticated server client, plex.tv account
//! discovery, the connection manager, and diagnostics log handling.

pub mod account;
pub mod client;
pub mod connection;
pub mod logs;
pub mod types;

pub use client::PlexServer;
pub use connection::ConnectionManager;
