//! Player command vocabulary.
//!
//! Closed enums instead of free-form action strings: an unsupported action
//! fails schema validation before it ever reaches dispatch, and the match
//! arms below are exhaustiveness-checked.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::error::PlexError;

pub const VOLUME_MAX: u32 = 100;

/// Playback commands accepted by `control_playback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    Play,
    Pause,
    Stop,
    SkipNext,
    SkipPrevious,
    StepForward,
    StepBack,
    /// Requires `offset_ms`.
    SeekTo,
    /// Requires `volume` (0-100).
    SetVolume,
}

impl PlaybackAction {
    /// Remote command path relative to the player endpoint.
    pub fn command_path(&self) -> &'static str {
        match self {
            Self::Play => "playback/play",
            Self::Pause => "playback/pause",
            Self::Stop => "playback/stop",
            Self::SkipNext => "playback/skipNext",
            Self::SkipPrevious => "playback/skipPrevious",
            Self::StepForward => "playback/stepForward",
            Self::StepBack => "playback/stepBack",
            Self::SeekTo => "playback/seekTo",
            Self::SetVolume => "playback/setParameters",
        }
    }

    /// Query parameters for the command, validating the arguments the
    /// variant requires.
    pub fn command_params(
        &self,
        offset_ms: Option<u64>,
        volume: Option<u32>,
    ) -> Result<Vec<(String, String)>, PlexError> {
        match self {
            Self::SeekTo => {
                let offset = offset_ms.ok_or_else(|| {
                    PlexError::Validation("seek_to requires offset_ms".to_string())
                })?;
                Ok(vec![("offset".to_string(), offset.to_string())])
            }
            Self::SetVolume => {
                let volume = volume.ok_or_else(|| {
                    PlexError::Validation("set_volume requires volume".to_string())
                })?;
                if volume > VOLUME_MAX {
                    return Err(PlexError::Validation(format!(
                        "volume must be between 0 and {VOLUME_MAX}, got {volume}"
                    )));
                }
                Ok(vec![("volume".to_string(), volume.to_string())])
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// On-screen navigation commands accepted by `navigate_client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Select,
    Back,
    Home,
}

impl NavigationAction {
    pub fn command_path(&self) -> &'static str {
        match self {
            Self::MoveUp => "navigation/moveUp",
            Self::MoveDown => "navigation/moveDown",
            Self::MoveLeft => "navigation/moveLeft",
            Self::MoveRight => "navigation/moveRight",
            Self::Select => "navigation/select",
            Self::Back => "navigation/back",
            Self::Home => "navigation/home",
        }
    }
}
