//! Playback Events
//!
//! Event-based communication for UI synchronization.
//! Events are emitted at key points:
//! - State changes (optimistic and confirmed)
//! - Media switches
//! - Position updates (every poll tick)
//! - Loop-window restarts

use crate::types::{MediaRef, PlaybackState};
use serde::{Deserialize, Serialize};

/// Events emitted by a playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Session state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A different media item was loaded
    MediaChanged {
        /// Item now loaded
        media: MediaRef,
        /// Item that was loaded before the switch
        previous: MediaRef,
    },

    /// Position update (every poll tick and on seek)
    PositionUpdate {
        media: MediaRef,
        position_seconds: f64,
        duration_seconds: f64,
    },

    /// Mute toggled
    MuteChanged { muted: bool },

    /// Playback was sent back to the loop window start
    LoopRestarted {
        media: MediaRef,
        start_seconds: f64,
    },

    /// Attach failure or player runtime error
    Error { message: String },
}
