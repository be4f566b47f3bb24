//! Shared fakes for the controller integration tests
//!
//! The fake player records every command it receives and reports whatever
//! position/duration the test scripts into it.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use swar_playback::{
    AttachOptions, ManualTimers, MediaPlayer, MediaRef, MountTarget, NoticeSink,
    PlaybackController, PlaybackError, PlaybackEvent, PlayerConfig, PlayerEnvironment,
    PlayerLibrary, PlayerLoader, PlayerNotice, PlayerState, Result, ScriptInjector, TimerHandle,
    TimerSource,
};

// ===== Commands =====

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Mute,
    Unmute,
    SeekTo(f64),
    Load(String),
    Destroy,
}

// ===== Fake Player =====

#[derive(Default)]
struct FakeHandleState {
    position: f64,
    duration: f64,
    commands: Vec<Command>,
    sink: Option<NoticeSink>,
    echo: bool,
}

/// Test-side view of one attached fake player
#[derive(Clone, Default)]
pub struct FakeHandle(Rc<RefCell<FakeHandleState>>);

impl FakeHandle {
    pub fn set_position(&self, seconds: f64) {
        self.0.borrow_mut().position = seconds;
    }

    pub fn set_duration(&self, seconds: f64) {
        self.0.borrow_mut().duration = seconds;
    }

    pub fn position(&self) -> f64 {
        self.0.borrow().position
    }

    pub fn commands(&self) -> Vec<Command> {
        self.0.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.0.borrow_mut().commands.clear();
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.0
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::SeekTo(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, command: &Command) -> usize {
        self.0.borrow().commands.iter().filter(|c| *c == command).count()
    }

    pub fn destroyed(&self) -> bool {
        self.count(&Command::Destroy) > 0
    }

    /// Emit a notice the way the real player would
    pub fn notify(&self, notice: PlayerNotice) {
        let sink = self.0.borrow().sink.clone();
        if let Some(sink) = sink {
            sink.deliver(notice);
        }
    }

    fn record(&self, command: Command) {
        self.0.borrow_mut().commands.push(command);
    }

    fn echo(&self, state: PlayerState) {
        if self.0.borrow().echo {
            self.notify(PlayerNotice::StateChanged(state));
        }
    }
}

struct FakePlayer {
    fake: FakeHandle,
}

impl MediaPlayer for FakePlayer {
    fn play(&mut self) {
        self.fake.record(Command::Play);
        self.fake.echo(PlayerState::Playing);
    }

    fn pause(&mut self) {
        self.fake.record(Command::Pause);
        self.fake.echo(PlayerState::Paused);
    }

    fn mute(&mut self) {
        self.fake.record(Command::Mute);
    }

    fn unmute(&mut self) {
        self.fake.record(Command::Unmute);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.fake.record(Command::SeekTo(seconds));
        self.fake.set_position(seconds);
    }

    fn load_media(&mut self, media: &MediaRef) {
        self.fake.record(Command::Load(media.as_str().to_string()));
        let mut state = self.fake.0.borrow_mut();
        state.position = 0.0;
        state.duration = 0.0;
    }

    fn current_position(&self) -> f64 {
        self.fake.position()
    }

    fn duration(&self) -> f64 {
        self.fake.0.borrow().duration
    }

    fn destroy(&mut self) {
        self.fake.record(Command::Destroy);
    }
}

// ===== Fake Library =====

/// Attaches fake players and keeps a handle to each
#[derive(Default)]
pub struct FakeLibrary {
    fakes: RefCell<Vec<FakeHandle>>,
    options: RefCell<Vec<AttachOptions>>,
    missing_targets: RefCell<Vec<String>>,
    initial_duration: Cell<f64>,
    echo: Cell<bool>,
}

impl FakeLibrary {
    pub fn players(&self) -> usize {
        self.fakes.borrow().len()
    }

    pub fn fake(&self, index: usize) -> FakeHandle {
        self.fakes.borrow()[index].clone()
    }

    pub fn last_options(&self) -> Option<AttachOptions> {
        self.options.borrow().last().copied()
    }

    pub fn remove_target(&self, target: &str) {
        self.missing_targets.borrow_mut().push(target.to_string());
    }

    /// Duration reported by newly attached players
    pub fn set_initial_duration(&self, seconds: f64) {
        self.initial_duration.set(seconds);
    }

    /// Make players confirm play/pause with a notice from inside the command
    pub fn echo_state_changes(&self) {
        self.echo.set(true);
    }
}

impl PlayerLibrary for FakeLibrary {
    fn create_player(
        &self,
        target: &MountTarget,
        _media: &MediaRef,
        options: AttachOptions,
        notices: NoticeSink,
    ) -> Result<Box<dyn MediaPlayer>> {
        if self.missing_targets.borrow().iter().any(|t| t == target.as_str()) {
            return Err(PlaybackError::MountTargetMissing(target.to_string()));
        }

        let fake = FakeHandle::default();
        {
            let mut state = fake.0.borrow_mut();
            state.duration = self.initial_duration.get();
            state.sink = Some(notices);
            state.echo = self.echo.get();
        }
        self.fakes.borrow_mut().push(fake.clone());
        self.options.borrow_mut().push(options);

        Ok(Box::new(FakePlayer { fake }))
    }
}

// ===== Injector =====

#[derive(Clone, Default)]
pub struct CountingInjector {
    pub calls: Rc<Cell<usize>>,
    pub fail: bool,
}

impl ScriptInjector for CountingInjector {
    fn inject(&self) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            Err(PlaybackError::LibraryLoad("script blocked".to_string()))
        } else {
            Ok(())
        }
    }
}

// ===== Sticky Timers =====

/// Timers whose cancel is ignored, like an interval callback already queued
/// by the browser when it was cleared
#[derive(Clone, Default)]
pub struct StickyTimers {
    ticks: Rc<RefCell<Vec<Box<dyn FnMut()>>>>,
}

impl StickyTimers {
    pub fn fire(&self) {
        let mut ticks = std::mem::take(&mut *self.ticks.borrow_mut());
        for tick in ticks.iter_mut() {
            tick();
        }
        let mut slot = self.ticks.borrow_mut();
        ticks.append(&mut *slot);
        *slot = ticks;
    }

    pub fn created(&self) -> usize {
        self.ticks.borrow().len()
    }
}

struct StickyHandle;

impl TimerHandle for StickyHandle {
    fn cancel(&mut self) {}
}

impl TimerSource for StickyTimers {
    fn every(&self, _period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn TimerHandle> {
        self.ticks.borrow_mut().push(tick);
        Box::new(StickyHandle)
    }
}

// ===== Harness =====

pub struct Harness {
    pub loader: PlayerLoader,
    pub library: Rc<FakeLibrary>,
    pub timers: ManualTimers,
    pub injections: Rc<Cell<usize>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_injector(CountingInjector::default())
    }

    pub fn failing_library_load() -> Self {
        Self::with_injector(CountingInjector {
            fail: true,
            ..CountingInjector::default()
        })
    }

    fn with_injector(injector: CountingInjector) -> Self {
        init_tracing();
        let injections = Rc::clone(&injector.calls);
        let library = Rc::new(FakeLibrary::default());
        library.set_initial_duration(180.0);

        Self {
            loader: PlayerLoader::new(injector),
            library,
            timers: ManualTimers::new(),
            injections,
        }
    }

    pub fn env(&self) -> PlayerEnvironment {
        PlayerEnvironment {
            loader: self.loader.clone(),
            library: self.library.clone(),
            timers: Rc::new(self.timers.clone()),
        }
    }

    pub fn mount(&self, target: &str, config: PlayerConfig) -> PlaybackController {
        PlaybackController::mount(self.env(), MountTarget::new(target), config)
    }

    /// Mount, load the library and deliver the player's ready notice
    pub fn mount_ready(&self, target: &str, config: PlayerConfig) -> (PlaybackController, FakeHandle) {
        let controller = self.mount(target, config);
        self.loader.mark_ready();
        let fake = self.library.fake(self.library.players() - 1);
        fake.notify(PlayerNotice::Ready);
        (controller, fake)
    }

    /// Like [`Harness::mount_ready`], then start playback and confirm it
    pub fn mount_playing(&self, target: &str, config: PlayerConfig) -> (PlaybackController, FakeHandle) {
        let (controller, fake) = self.mount_ready(target, config);
        if controller.state() != swar_playback::PlaybackState::Playing {
            controller.toggle_play_pause();
        }
        fake.notify(PlayerNotice::StateChanged(PlayerState::Playing));
        (controller, fake)
    }

    /// Advance the player to `position` and fire one poll round
    pub fn tick_at(&self, fake: &FakeHandle, position: f64) {
        fake.set_position(position);
        self.timers.fire();
    }
}

pub fn media(id: &str) -> MediaRef {
    MediaRef::new(id).unwrap()
}

pub fn state_changes(events: &[PlaybackEvent]) -> Vec<swar_playback::PlaybackState> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::StateChanged { state } => Some(*state),
            _ => None,
        })
        .collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("swar_playback=debug")
        .with_test_writer()
        .try_init();
}
