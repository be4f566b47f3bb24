//! Bindings to the iframe player API

use crate::{
    AttachOptions, MediaPlayer, MediaRef, MountTarget, NoticeSink, PlaybackError, PlayerLibrary,
    PlayerLoader, PlayerNotice, PlayerState, Result, ScriptInjector,
};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Script that loads the player library
pub const IFRAME_API_SRC: &str = "https://www.youtube.com/iframe_api";

/// Global the library calls once it has loaded
const READY_HOOK: &str = "onYouTubeIframeAPIReady";

#[wasm_bindgen]
extern "C" {
    /// Player object returned by the host's factory
    pub type JsPlayer;

    #[wasm_bindgen(method, js_name = playVideo)]
    fn play_video(this: &JsPlayer);

    #[wasm_bindgen(method, js_name = pauseVideo)]
    fn pause_video(this: &JsPlayer);

    #[wasm_bindgen(method)]
    fn mute(this: &JsPlayer);

    #[wasm_bindgen(method, js_name = unMute)]
    fn un_mute(this: &JsPlayer);

    #[wasm_bindgen(method, js_name = seekTo)]
    fn seek_to(this: &JsPlayer, seconds: f64, allow_seek_ahead: bool);

    #[wasm_bindgen(method, js_name = loadVideoById)]
    fn load_video_by_id(this: &JsPlayer, media_id: &str);

    // Getters throw until the iframe has finished attaching
    #[wasm_bindgen(method, catch, js_name = getCurrentTime)]
    fn get_current_time(this: &JsPlayer) -> std::result::Result<f64, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getDuration)]
    fn get_duration(this: &JsPlayer) -> std::result::Result<f64, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &JsPlayer) -> std::result::Result<(), JsValue>;
}

struct JsMediaPlayer {
    inner: JsPlayer,
}

impl MediaPlayer for JsMediaPlayer {
    fn play(&mut self) {
        self.inner.play_video();
    }

    fn pause(&mut self) {
        self.inner.pause_video();
    }

    fn mute(&mut self) {
        self.inner.mute();
    }

    fn unmute(&mut self) {
        self.inner.un_mute();
    }

    fn seek_to(&mut self, seconds: f64) {
        self.inner.seek_to(seconds, true);
    }

    fn load_media(&mut self, media: &MediaRef) {
        self.inner.load_video_by_id(media.as_str());
    }

    fn current_position(&self) -> f64 {
        self.inner.get_current_time().unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.inner.get_duration().unwrap_or(0.0)
    }

    fn destroy(&mut self) {
        if let Err(e) = self.inner.destroy() {
            tracing::debug!("Player destroy threw: {:?}", e);
        }
    }
}

/// Attaches players through a JavaScript factory
///
/// The factory is called as `factory(targetId, mediaId, options)` and must
/// return the player object. `options.onNotice(kind, code)` is to be called
/// with `"ready"`, `"stateChange"` or `"error"`.
pub struct JsPlayerLibrary {
    factory: Function,
}

impl JsPlayerLibrary {
    pub fn new(factory: Function) -> Self {
        Self { factory }
    }
}

impl PlayerLibrary for JsPlayerLibrary {
    fn create_player(
        &self,
        target: &MountTarget,
        media: &MediaRef,
        options: AttachOptions,
        notices: NoticeSink,
    ) -> Result<Box<dyn MediaPlayer>> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PlaybackError::MountTargetMissing(target.to_string()))?;
        if document.get_element_by_id(target.as_str()).is_none() {
            return Err(PlaybackError::MountTargetMissing(target.to_string()));
        }

        let js_options = attach_options_object(&options, notices)?;
        let player = self
            .factory
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(target.as_str()),
                &JsValue::from_str(media.as_str()),
                &js_options,
            )
            .map_err(|e| PlaybackError::InvalidOperation(describe(&e)))?;

        Ok(Box::new(JsMediaPlayer {
            inner: player.unchecked_into(),
        }))
    }
}

fn attach_options_object(options: &AttachOptions, notices: NoticeSink) -> Result<JsValue> {
    let object = Object::new();
    set(&object, "autoplay", &JsValue::from_bool(options.autoplay))?;
    set(&object, "muted", &JsValue::from_bool(options.muted))?;
    set(&object, "controls", &JsValue::from_bool(options.show_controls))?;
    if let Some(start) = options.start_seconds {
        set(&object, "start", &JsValue::from_f64(start))?;
    }

    let on_notice = Closure::<dyn FnMut(String, i32)>::new(move |kind: String, code: i32| {
        let notice = match kind.as_str() {
            "ready" => PlayerNotice::Ready,
            "stateChange" => match PlayerState::from_code(code) {
                Some(state) => PlayerNotice::StateChanged(state),
                None => return,
            },
            "error" => PlayerNotice::Error(code),
            _ => return,
        };
        notices.deliver(notice);
    });
    set(&object, "onNotice", &on_notice.into_js_value())?;

    Ok(object.into())
}

/// Inserts the library's script tag into the document
pub struct ScriptTagInjector {
    src: String,
}

impl ScriptTagInjector {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

impl ScriptInjector for ScriptTagInjector {
    fn inject(&self) -> Result<()> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PlaybackError::LibraryLoad("no document".to_string()))?;

        let script = document
            .create_element("script")
            .map_err(|e| PlaybackError::LibraryLoad(describe(&e)))?;
        script
            .set_attribute("src", &self.src)
            .map_err(|e| PlaybackError::LibraryLoad(describe(&e)))?;

        let scripts = document.get_elements_by_tag_name("script");
        let anchor = scripts
            .item(0)
            .and_then(|first| first.parent_node().map(|parent| (parent, first)));
        let inserted = match anchor {
            Some((parent, first)) => parent.insert_before(&script, Some(&*first)),
            None => match document.document_element() {
                Some(root) => root.append_child(&script),
                None => return Err(PlaybackError::LibraryLoad("no document root".to_string())),
            },
        };
        inserted.map_err(|e| PlaybackError::LibraryLoad(describe(&e)))?;

        tracing::info!("Inserted player library script {}", self.src);
        Ok(())
    }
}

/// Route the library's global ready callback to `loader`
///
/// Marks the loader ready straight away when the library is already present.
pub fn install_ready_hook(loader: &PlayerLoader) -> Result<()> {
    let window =
        web_sys::window().ok_or_else(|| PlaybackError::LibraryLoad("no window".to_string()))?;

    let ready = loader.clone();
    let hook = Closure::<dyn FnMut()>::new(move || ready.mark_ready());
    Reflect::set(&window, &JsValue::from_str(READY_HOOK), &hook.into_js_value())
        .map_err(|e| PlaybackError::LibraryLoad(describe(&e)))?;

    let library = Reflect::get(&window, &JsValue::from_str("YT")).unwrap_or(JsValue::UNDEFINED);
    let has_player = !library.is_undefined()
        && Reflect::get(&library, &JsValue::from_str("Player"))
            .map(|p| p.is_function())
            .unwrap_or(false);
    if has_player {
        loader.mark_ready();
    }
    Ok(())
}

fn set(object: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(object, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| PlaybackError::InvalidOperation(describe(&e)))
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
