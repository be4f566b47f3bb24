//! WASM-compatible PlaybackController wrapper

use super::bindings::{install_ready_hook, JsPlayerLibrary, ScriptTagInjector, IFRAME_API_SRC};
use super::timers::GlooTimers;
use crate::{
    MediaRef, MountTarget, PlaybackController, PlaybackError, PlaybackState, PlayerConfig,
    PlayerEnvironment, PlayerLoader,
};
use js_sys::Function;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// WASM-compatible playback controller
///
/// Events raised by commands are delivered to the `onEvent` callback right
/// away. Events raised by the player itself (polling, state notices) are
/// collected until the next command or `drainEvents` call; position and
/// loop-restart events are coalesced, so an untouched player keeps at most
/// one of each pending.
#[wasm_bindgen]
pub struct WasmPlaybackController {
    inner: PlaybackController,
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlaybackController {
    /// Mount a controller on the element with id `targetId`
    ///
    /// `config` is a `PlayerConfig` object. `playerFactory` creates the
    /// underlying player; see [`JsPlayerLibrary`].
    #[wasm_bindgen(constructor)]
    pub fn new(
        target_id: String,
        config: JsValue,
        player_factory: Function,
    ) -> Result<WasmPlaybackController, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlayerConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;

        let loader = PlayerLoader::shared(|| ScriptTagInjector::new(IFRAME_API_SRC));
        install_ready_hook(&loader).map_err(to_js)?;

        let env = PlayerEnvironment {
            loader,
            library: Rc::new(JsPlayerLibrary::new(player_factory)),
            timers: Rc::new(GlooTimers),
        };

        Ok(Self {
            inner: PlaybackController::mount(env, MountTarget::new(target_id), config),
            on_event: None,
        })
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        self.inner.toggle_play_pause();
        self.dispatch_events();
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.inner.toggle_mute();
        self.dispatch_events();
    }

    /// Seek to a fraction (0..1) of the duration
    #[wasm_bindgen(js_name = seekFraction)]
    pub fn seek_fraction(&self, fraction: f64) {
        self.inner.seek_fraction(fraction);
        self.dispatch_events();
    }

    /// Switch to another media item by id
    #[wasm_bindgen(js_name = switchMedia)]
    pub fn switch_media(&self, media_id: String) -> Result<(), JsValue> {
        let media = MediaRef::new(media_id).map_err(to_js)?;
        self.inner.switch_media(media);
        self.dispatch_events();
        Ok(())
    }

    pub fn teardown(&self) {
        self.inner.teardown();
        self.dispatch_events();
    }

    // ===== State Queries =====

    /// Current state: "unstarted" | "ready" | "playing" | "paused" | "ended" | "error"
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        match self.inner.state() {
            PlaybackState::Unstarted => "unstarted",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
            PlaybackState::Error => "error",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = getMedia)]
    pub fn get_media(&self) -> String {
        self.inner.media().as_str().to_string()
    }

    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> f64 {
        self.inner.position_seconds()
    }

    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> f64 {
        self.inner.duration_seconds()
    }

    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.is_muted()
    }

    /// Remembered progress for a media id, or null
    #[wasm_bindgen(js_name = getProgress)]
    pub fn get_progress(&self, media_id: String) -> JsValue {
        MediaRef::new(media_id)
            .ok()
            .and_then(|media| self.inner.progress(&media))
            .and_then(|progress| serde_wasm_bindgen::to_value(&progress).ok())
            .unwrap_or(JsValue::NULL)
    }

    // ===== Events =====

    /// Register the event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    /// Take pending events as an array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.drain_events()).unwrap_or(JsValue::NULL)
    }

    fn dispatch_events(&self) {
        let events = self.inner.drain_events();
        let Some(ref cb) = self.on_event else {
            return;
        };
        for event in events {
            if let Ok(js_event) = serde_wasm_bindgen::to_value(&event) {
                cb.call1(&JsValue::NULL, &js_event).ok();
            }
        }
    }
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
