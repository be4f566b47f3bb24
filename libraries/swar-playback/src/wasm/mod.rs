//! WASM bindings for swar-playback
//!
//! Browser implementations of the player, loader and timer traits, and a
//! JavaScript-facing wrapper around [`PlaybackController`](crate::PlaybackController).

pub mod bindings;
pub mod controller;
pub mod timers;

pub use bindings::{install_ready_hook, JsPlayerLibrary, ScriptTagInjector, IFRAME_API_SRC};
pub use controller::WasmPlaybackController;
pub use timers::GlooTimers;
