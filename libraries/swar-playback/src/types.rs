//! Core types for playback control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a playable media item (e.g. a video id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaRef(String);

impl MediaRef {
    /// Create a media reference, rejecting blank identifiers
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PlaybackError::InvalidMediaRef(id));
        }
        Ok(Self(id))
    }

    /// Get the inner identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MediaRef {
    type Error = PlaybackError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MediaRef> for String {
    fn from(media: MediaRef) -> Self {
        media.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the surface a player attaches to (a DOM element id in the browser)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountTarget(String);

impl MountTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session state as seen by the hosting view
///
/// `Playing` and `Paused` may be set optimistically by a command and are
/// reconciled by the next player notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Player not attached yet
    Unstarted,

    /// Player attached, nothing playing
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-item
    Paused,

    /// Item reached its end
    Ended,

    /// Attach failed or the player reported an error; terminal
    Error,
}

impl PlaybackState {
    /// Whether player commands may be issued in this state
    pub fn is_attached(self) -> bool {
        !matches!(self, Self::Unstarted | Self::Error)
    }
}

/// State reported by the external player
///
/// Numeric codes follow the embedded player's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Map a raw player state code, `None` for codes we do not know
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Notification delivered by the external player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerNotice {
    /// Player finished attaching and accepts commands
    Ready,

    /// Player changed state
    StateChanged(PlayerState),

    /// Player reported a runtime error
    Error(i32),
}

/// Interval that playback is confined to by corrective seeks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoopWindow")]
pub struct LoopWindow {
    start_seconds: f64,
    end_seconds: f64,
}

#[derive(Deserialize)]
struct RawLoopWindow {
    start_seconds: f64,
    end_seconds: f64,
}

impl TryFrom<RawLoopWindow> for LoopWindow {
    type Error = PlaybackError;

    fn try_from(raw: RawLoopWindow) -> Result<Self> {
        Self::new(raw.start_seconds, raw.end_seconds)
    }
}

impl LoopWindow {
    /// Create a loop window; `start` must be non-negative and strictly before `end`
    pub fn new(start_seconds: f64, end_seconds: f64) -> Result<Self> {
        let valid = start_seconds.is_finite()
            && end_seconds.is_finite()
            && start_seconds >= 0.0
            && end_seconds > start_seconds;

        if !valid {
            return Err(PlaybackError::InvalidLoopWindow {
                start: start_seconds,
                end: end_seconds,
            });
        }

        Ok(Self {
            start_seconds,
            end_seconds,
        })
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_seconds
    }

    /// Whether a position falls outside `[start, end)` and must be corrected
    pub fn needs_correction(&self, position_seconds: f64) -> bool {
        position_seconds >= self.end_seconds || position_seconds < self.start_seconds
    }
}

/// Flags handed to the external player when it attaches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachOptions {
    pub autoplay: bool,
    pub muted: bool,
    pub show_controls: bool,

    /// Position the player should start from, if not the beginning
    pub start_seconds: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_ref_rejects_blank() {
        assert!(MediaRef::new("").is_err());
        assert!(MediaRef::new("   ").is_err());
        assert_eq!(MediaRef::new("fveOYRT4DDw").unwrap().as_str(), "fveOYRT4DDw");
    }

    #[test]
    fn media_ref_deserialize_validates() {
        let ok: std::result::Result<MediaRef, _> = serde_json::from_str("\"abc\"");
        assert!(ok.is_ok());

        let blank: std::result::Result<MediaRef, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }

    #[test]
    fn loop_window_bounds() {
        assert!(LoopWindow::new(20.0, 40.0).is_ok());
        assert!(LoopWindow::new(40.0, 20.0).is_err());
        assert!(LoopWindow::new(20.0, 20.0).is_err());
        assert!(LoopWindow::new(-1.0, 20.0).is_err());
        assert!(LoopWindow::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn loop_window_correction() {
        let window = LoopWindow::new(20.0, 40.0).unwrap();
        assert!(window.needs_correction(0.0));
        assert!(window.needs_correction(19.9));
        assert!(!window.needs_correction(20.0));
        assert!(!window.needs_correction(39.9));
        assert!(window.needs_correction(40.0));
        assert!(window.needs_correction(41.0));
    }

    #[test]
    fn player_state_codes() {
        for state in [
            PlayerState::Unstarted,
            PlayerState::Ended,
            PlayerState::Playing,
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Cued,
        ] {
            assert_eq!(PlayerState::from_code(state.code()), Some(state));
        }
        assert_eq!(PlayerState::from_code(4), None);
    }

    #[test]
    fn attached_states() {
        assert!(!PlaybackState::Unstarted.is_attached());
        assert!(!PlaybackState::Error.is_attached());
        assert!(PlaybackState::Ready.is_attached());
        assert!(PlaybackState::Ended.is_attached());
    }
}
