//! Domain layer: configuration, error taxonomy, playback actions, and
//! response shaping. Nothing in this module performs I/O.

pub mod action;
pub mod config;
pub mod error;
pub mod summary;

pub use action::{NavigationAction, PlaybackAction};
pub use config::{ConnectionSettings, HttpSettings, OAuthSettings, Settings, TransportKind};
pub use error::{Candidate, PlexError};
pub use summary::{FormatError, MediaSummary};
