//! Error types for the playback controller

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The external player library could not be loaded
    #[error("Player library failed to load: {0}")]
    LibraryLoad(String),

    /// The surface the player should attach to does not exist
    #[error("Mount target missing: {0}")]
    MountTargetMissing(String),

    /// A content item has no playable media reference
    #[error("No playable media for item: {0}")]
    MediaUnavailable(String),

    /// A media reference was empty or malformed
    #[error("Invalid media reference: {0:?}")]
    InvalidMediaRef(String),

    /// Loop window bounds are not a forward interval
    #[error("Invalid loop window: start {start}s, end {end}s")]
    InvalidLoopWindow { start: f64, end: f64 },

    /// The external player reported a runtime error
    #[error("Player error code {code}")]
    Player { code: i32 },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
