//! Platform-agnostic external player traits
//!
//! Abstracts the embedded media player (an iframe video player in the
//! browser, a scripted fake in tests).

use crate::controller::NoticeSink;
use crate::error::Result;
use crate::types::{AttachOptions, MediaRef, MountTarget};

/// Handle to one attached external player
///
/// Every command is fire-and-forget: implementors return immediately and
/// report the outcome later through the [`NoticeSink`] they were given.
pub trait MediaPlayer {
    fn play(&mut self);

    fn pause(&mut self);

    fn mute(&mut self);

    fn unmute(&mut self);

    /// Seek to an absolute position in seconds
    fn seek_to(&mut self, seconds: f64);

    /// Replace the loaded media item
    fn load_media(&mut self, media: &MediaRef);

    /// Current playback position in seconds
    fn current_position(&self) -> f64;

    /// Duration of the loaded item in seconds, 0 while unknown
    fn duration(&self) -> f64;

    /// Release the player and its surface
    fn destroy(&mut self);
}

/// The loaded player library, able to attach players to mount targets
pub trait PlayerLibrary {
    /// Attach a new player to `target` with `media` loaded
    ///
    /// The player announces readiness with a `Ready` notice on `notices`.
    /// Returns `MountTargetMissing` when the target surface does not exist.
    fn create_player(
        &self,
        target: &MountTarget,
        media: &MediaRef,
        options: AttachOptions,
        notices: NoticeSink,
    ) -> Result<Box<dyn MediaPlayer>>;
}
