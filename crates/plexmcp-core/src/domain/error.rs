//! Error taxonomy shared by the facade and the tool layer.

use serde::Serialize;
use thiserror::Error;

/// One entry in a disambiguation list returned when a human-supplied name
/// matches more than one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Rating key or machine identifier the caller can retry with.
    pub id: String,
    pub title: String,
    /// Extra context distinguishing the candidates (library, product, year).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Every failure a tool operation can surface.
///
/// Operations never propagate these past their boundary; the tool layer
/// renders them into an error payload (or a disambiguation payload for
/// `Ambiguous`, which is recoverable by retrying with an id).
#[derive(Debug, Error)]
pub enum PlexError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not connect to Plex after {attempts} attempts: {message}")]
    Connection { attempts: u32, message: String },

    #[error("no {kind} found matching '{name}'")]
    NotFound { kind: &'static str, name: String },

    #[error("{} {kind} entries match '{name}'", .candidates.len())]
    Ambiguous {
        kind: &'static str,
        name: String,
        candidates: Vec<Candidate>,
    },

    #[error("Plex API returned HTTP {status}: {message}")]
    RemoteApi { status: u16, message: String },

    #[error("invalid parameter: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from Plex: {0}")]
    Decode(String),
}

impl PlexError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Stable machine-readable tag used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Connection { .. } => "connection",
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::RemoteApi { .. } => "remote_api",
            Self::Validation(_) => "validation",
            Self::Http(_) => "http",
            Self::Decode(_) => "decode",
        }
    }

    /// Whether another connection attempt could plausibly succeed. Transport
    /// and server-side failures are retryable; misconfiguration, invalid
    /// input, and name-resolution outcomes are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RemoteApi { .. } | Self::Decode(_)
        )
    }
}
