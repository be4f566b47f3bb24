//! Controller configuration and the presets used by the app's three players

use crate::types::{AttachOptions, LoopWindow, MediaRef};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll interval for smooth progress bars
pub const PROGRESS_POLL_INTERVAL_MS: u64 = 100;

/// Poll interval for coarse loop-window enforcement
pub const LOOP_POLL_INTERVAL_MS: u64 = 500;

/// Configuration for one playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Media loaded when the player attaches
    pub initial_media: MediaRef,

    /// Start playing as soon as the player is ready (default: false)
    #[serde(default)]
    pub autoplay: bool,

    /// Start muted (default: false)
    #[serde(default)]
    pub muted: bool,

    /// Show the player's native controls (default: false)
    #[serde(default)]
    pub show_controls: bool,

    /// Confine playback to this interval (default: none)
    #[serde(default)]
    pub loop_window: Option<LoopWindow>,

    /// Position polling interval in milliseconds (default: 100)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Remember progress per media item (default: false)
    #[serde(default)]
    pub track_progress: bool,
}

fn default_poll_interval_ms() -> u64 {
    PROGRESS_POLL_INTERVAL_MS
}

impl PlayerConfig {
    /// Plain configuration: no autoplay, no loop, no progress cache
    pub fn new(initial_media: MediaRef) -> Self {
        Self {
            initial_media,
            autoplay: false,
            muted: false,
            show_controls: false,
            loop_window: None,
            poll_interval_ms: default_poll_interval_ms(),
            track_progress: false,
        }
    }

    /// Always-looping background clip (hero video)
    pub fn background_loop(media: MediaRef, window: LoopWindow) -> Self {
        Self {
            autoplay: true,
            loop_window: Some(window),
            poll_interval_ms: LOOP_POLL_INTERVAL_MS,
            ..Self::new(media)
        }
    }

    /// Single daily-pick track with a progress bar
    pub fn daily_session(media: MediaRef) -> Self {
        Self::new(media)
    }

    /// Multi-item switchable player that remembers progress per item
    pub fn explorer(default_media: MediaRef) -> Self {
        Self {
            track_progress: true,
            ..Self::new(default_media)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Flags passed to the external player on attach
    pub fn attach_options(&self) -> AttachOptions {
        AttachOptions {
            autoplay: self.autoplay,
            muted: self.muted,
            show_controls: self.show_controls,
            start_seconds: self.loop_window.map(|w| w.start_seconds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(id: &str) -> MediaRef {
        MediaRef::new(id).unwrap()
    }

    #[test]
    fn default_config() {
        let config = PlayerConfig::new(media("a"));
        assert!(!config.autoplay);
        assert!(!config.muted);
        assert!(config.loop_window.is_none());
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert!(!config.track_progress);
    }

    #[test]
    fn background_loop_preset() {
        let window = LoopWindow::new(20.0, 40.0).unwrap();
        let config = PlayerConfig::background_loop(media("hero"), window);
        assert!(config.autoplay);
        assert_eq!(config.loop_window, Some(window));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));

        let options = config.attach_options();
        assert_eq!(options.start_seconds, Some(20.0));
        assert!(!options.show_controls);
    }

    #[test]
    fn explorer_preset_tracks_progress() {
        let config = PlayerConfig::explorer(media("raga"));
        assert!(config.track_progress);
        assert!(!config.autoplay);
    }

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{
            "initial_media": "iDSoI-z6qaY",
            "autoplay": true,
            "loop_window": { "start_seconds": 20.0, "end_seconds": 40.0 }
        }"#;

        let config: PlayerConfig = serde_json::from_str(json).unwrap();
        assert!(config.autoplay);
        assert_eq!(config.poll_interval_ms, PROGRESS_POLL_INTERVAL_MS);
        assert_eq!(config.loop_window.unwrap().end_seconds(), 40.0);
    }

    #[test]
    fn deserialize_rejects_inverted_window() {
        let json = r#"{
            "initial_media": "x",
            "loop_window": { "start_seconds": 40.0, "end_seconds": 20.0 }
        }"#;

        assert!(serde_json::from_str::<PlayerConfig>(json).is_err());
    }
}
