//! House of Swar - Playback Control
//!
//! Platform-agnostic controller for the embedded media players of the app:
//! the looping hero video, the daily listening session and the raga explorer.
//!
//! This crate provides:
//! - A play/pause/mute/seek/switch state machine over an external player
//! - Position polling with at most one live timer per session
//! - Loop-window enforcement by corrective seeks
//! - Per-item progress memory for multi-item players
//! - A process-wide, load-once player library loader
//!
//! # Architecture
//!
//! `swar-playback` does not talk to the browser directly. The external
//! player, the script that loads it and the timers that drive polling are
//! provided via traits ([`PlayerLibrary`], [`MediaPlayer`], [`ScriptInjector`],
//! [`TimerSource`]). The `wasm` feature supplies browser implementations.
//!
//! # Example: Looping background clip
//!
//! ```rust
//! use std::rc::Rc;
//! use swar_playback::{
//!     AttachOptions, LoopWindow, ManualTimers, MediaPlayer, MediaRef, MountTarget,
//!     NoticeSink, PlaybackController, PlaybackState, PlayerConfig, PlayerEnvironment,
//!     PlayerLibrary, PlayerLoader, PlayerNotice, Result, ScriptInjector,
//! };
//!
//! struct NoScript;
//! impl ScriptInjector for NoScript {
//!     fn inject(&self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct SilentPlayer;
//! impl MediaPlayer for SilentPlayer {
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn mute(&mut self) {}
//!     fn unmute(&mut self) {}
//!     fn seek_to(&mut self, _seconds: f64) {}
//!     fn load_media(&mut self, _media: &MediaRef) {}
//!     fn current_position(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> f64 { 120.0 }
//!     fn destroy(&mut self) {}
//! }
//!
//! struct Library;
//! impl PlayerLibrary for Library {
//!     fn create_player(
//!         &self,
//!         _target: &MountTarget,
//!         _media: &MediaRef,
//!         _options: AttachOptions,
//!         _notices: NoticeSink,
//!     ) -> Result<Box<dyn MediaPlayer>> {
//!         Ok(Box::new(SilentPlayer))
//!     }
//! }
//!
//! let loader = PlayerLoader::new(NoScript);
//! let env = PlayerEnvironment {
//!     loader: loader.clone(),
//!     library: Rc::new(Library),
//!     timers: Rc::new(ManualTimers::new()),
//! };
//!
//! let config = PlayerConfig::background_loop(
//!     MediaRef::new("iDSoI-z6qaY")?,
//!     LoopWindow::new(20.0, 40.0)?,
//! );
//! let hero = PlaybackController::mount(env, MountTarget::new("hero-video"), config);
//! assert_eq!(hero.state(), PlaybackState::Unstarted);
//!
//! // The host reports the library and the player becoming ready
//! loader.mark_ready();
//! hero.handle_notice(PlayerNotice::Ready);
//!
//! assert_eq!(hero.state(), PlaybackState::Playing);
//! assert_eq!(hero.position_seconds(), 20.0);
//! # Ok::<(), swar_playback::PlaybackError>(())
//! ```

mod config;
mod controller;
mod directory;
mod error;
mod events;
mod loader;
mod player;
mod progress;
mod timer;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::{PlayerConfig, LOOP_POLL_INTERVAL_MS, PROGRESS_POLL_INTERVAL_MS};
pub use controller::{NoticeSink, PlaybackController, PlayerEnvironment};
pub use directory::{DaySegment, MediaDirectory};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use loader::{LoadStatus, LoaderLease, PlayerLoader, ScriptInjector, SubscriptionId};
pub use player::{MediaPlayer, PlayerLibrary};
pub use progress::{format_clock, Progress, ProgressCache};
pub use timer::{ManualTimers, PollTicket, TimerHandle, TimerSource};
pub use types::{
    AttachOptions, LoopWindow, MediaRef, MountTarget, PlaybackState, PlayerNotice, PlayerState,
};
