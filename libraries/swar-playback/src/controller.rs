//! Playback controller - core orchestration
//!
//! Mediates between user intent (play/pause/mute/seek/switch) and an
//! asynchronously attaching external player. Commands update the UI-facing
//! state optimistically; player notices are the source of truth and
//! reconcile it.
//!
//! The controller is single-threaded. Timer ticks, player notices and the
//! library ready signal reach the session through weak references, so nothing
//! can touch a session after its view has torn it down.

use crate::{
    config::PlayerConfig,
    error::PlaybackError,
    events::PlaybackEvent,
    loader::{LoadStatus, LoaderLease, PlayerLoader, SubscriptionId},
    player::{MediaPlayer, PlayerLibrary},
    progress::{Progress, ProgressCache},
    timer::{PollTicket, PollTimer, TimerSource},
    types::{LoopWindow, MediaRef, MountTarget, PlaybackState, PlayerNotice, PlayerState},
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Collaborators a controller needs from its host
#[derive(Clone)]
pub struct PlayerEnvironment {
    /// Shared library loader
    pub loader: PlayerLoader,
    /// Attaches players once the library is loaded
    pub library: Rc<dyn PlayerLibrary>,
    /// Source of polling timers
    pub timers: Rc<dyn TimerSource>,
}

/// Where the external player delivers its notices
///
/// Notices are queued and applied in emission order. A notice emitted while
/// the controller is busy (e.g. from inside a player command) is applied as
/// soon as the current operation finishes. Delivering to a torn-down
/// controller is a no-op.
#[derive(Clone)]
pub struct NoticeSink {
    shared: Weak<Shared>,
}

impl NoticeSink {
    pub fn deliver(&self, notice: PlayerNotice) {
        if let Some(shared) = self.shared.upgrade() {
            shared.inbox.borrow_mut().push_back(notice);
            shared.pump();
        }
    }

    /// Whether the controller behind this sink still exists
    pub fn is_connected(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

struct Shared {
    session: RefCell<Session>,
    inbox: RefCell<VecDeque<PlayerNotice>>,
}

impl Shared {
    /// Apply queued notices while the session is free
    fn pump(&self) {
        loop {
            let Ok(mut session) = self.session.try_borrow_mut() else {
                return;
            };
            let next = self.inbox.borrow_mut().pop_front();
            match next {
                Some(notice) => session.apply_notice(notice),
                None => return,
            }
        }
    }

    fn on_tick(shared: &Weak<Shared>, ticket: &PollTicket) {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if let Ok(mut session) = shared.session.try_borrow_mut() {
            session.poll(ticket);
        }
        shared.pump();
    }
}

/// Media playback controller
///
/// Owns one external player attachment, its polling timer and, when
/// configured, a per-item progress cache. Dropping the controller tears the
/// session down.
pub struct PlaybackController {
    shared: Rc<Shared>,
}

impl PlaybackController {
    /// Create a session for `target` and start attaching the player
    ///
    /// Attaching waits for the shared library if it is still loading.
    pub fn mount(env: PlayerEnvironment, target: MountTarget, config: PlayerConfig) -> Self {
        let shared = Rc::new_cyclic(|weak| Shared {
            session: RefCell::new(Session::new(env, target, config, weak.clone())),
            inbox: RefCell::new(VecDeque::new()),
        });

        let controller = Self { shared };
        controller.attach();
        controller
    }

    fn attach(&self) {
        let loader = {
            let mut session = self.shared.session.borrow_mut();
            let loader = session.env.loader.clone();
            session.lease = Some(loader.acquire());
            loader
        };

        loader.ensure_loaded();

        match loader.status() {
            LoadStatus::Ready => self.with_session(Session::create_player),
            LoadStatus::Failed(reason) => {
                self.with_session(|s| s.fail(PlaybackError::LibraryLoad(reason)));
            }
            LoadStatus::Idle | LoadStatus::Loading => {
                let weak = Rc::downgrade(&self.shared);
                let id = loader.subscribe(move |outcome| {
                    let Some(shared) = weak.upgrade() else {
                        return;
                    };
                    {
                        let mut session = shared.session.borrow_mut();
                        session.subscription = None;
                        match outcome {
                            Ok(()) => session.create_player(),
                            Err(e) => session.fail(e),
                        }
                    }
                    shared.pump();
                });
                self.shared.session.borrow_mut().subscription = Some(id);
            }
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let result = {
            let mut session = self.shared.session.borrow_mut();
            f(&mut *session)
        };
        self.shared.pump();
        result
    }

    // ===== Playback Control =====

    /// Pause if playing, play if ready/paused/ended
    pub fn toggle_play_pause(&self) {
        self.with_session(Session::toggle_play_pause);
    }

    /// Flip mute and tell the player
    pub fn toggle_mute(&self) {
        self.with_session(Session::toggle_mute);
    }

    /// Seek to a fraction of the duration
    ///
    /// Out-of-range fractions are clamped to `[0, 1]`; non-finite ones are
    /// ignored, as is any seek while the duration is unknown.
    pub fn seek_fraction(&self, fraction: f64) {
        self.with_session(|s| s.seek_fraction(fraction));
    }

    /// Load a different media item and start playing it
    ///
    /// Switching to the item already loaded toggles play/pause instead.
    pub fn switch_media(&self, media: MediaRef) {
        self.with_session(|s| s.switch_media(media));
    }

    /// Stop polling, destroy the player and release the loader; idempotent
    pub fn teardown(&self) {
        self.with_session(Session::teardown);
        self.shared.inbox.borrow_mut().clear();
    }

    /// Apply a player notice directly
    pub fn handle_notice(&self, notice: PlayerNotice) {
        self.notice_sink().deliver(notice);
    }

    /// A sink the host can hand to player callbacks
    pub fn notice_sink(&self) -> NoticeSink {
        NoticeSink {
            shared: Rc::downgrade(&self.shared),
        }
    }

    // ===== State Queries =====

    pub fn state(&self) -> PlaybackState {
        self.shared.session.borrow().state
    }

    pub fn media(&self) -> MediaRef {
        self.shared.session.borrow().media.clone()
    }

    pub fn position_seconds(&self) -> f64 {
        self.shared.session.borrow().position_seconds
    }

    /// Duration of the loaded item, 0 while unknown
    pub fn duration_seconds(&self) -> f64 {
        self.shared.session.borrow().duration_seconds
    }

    pub fn is_muted(&self) -> bool {
        self.shared.session.borrow().muted
    }

    pub fn loop_window(&self) -> Option<LoopWindow> {
        self.shared.session.borrow().config.loop_window
    }

    /// Whether a polling timer is live
    pub fn is_polling(&self) -> bool {
        self.shared.session.borrow().poll.is_some()
    }

    /// False once the session has been torn down
    pub fn is_live(&self) -> bool {
        self.shared.session.borrow().live
    }

    /// Remembered progress for an item (progress-tracking configurations only)
    pub fn progress(&self, media: &MediaRef) -> Option<Progress> {
        self.shared
            .session
            .borrow()
            .progress
            .as_ref()
            .and_then(|cache| cache.get(media))
    }

    /// Snapshot of the whole progress cache
    pub fn progress_cache(&self) -> Option<ProgressCache> {
        self.shared.session.borrow().progress.clone()
    }

    // ===== Events =====

    /// Take all events emitted since the last drain
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.shared.session.borrow_mut().events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.shared.session.borrow().events.is_empty()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Ok(mut session) = self.shared.session.try_borrow_mut() {
            session.teardown();
        }
    }
}

struct Session {
    env: PlayerEnvironment,
    target: MountTarget,
    config: PlayerConfig,

    // State
    state: PlaybackState,
    media: MediaRef,
    position_seconds: f64,
    duration_seconds: f64,
    muted: bool,
    live: bool,

    // Attachment
    player: Option<Box<dyn MediaPlayer>>,
    subscription: Option<SubscriptionId>,
    lease: Option<LoaderLease>,

    // Polling
    poll: Option<PollTimer>,
    generation: u64,
    // A corrective loop seek was issued since the last tick
    loop_seek_pending: bool,

    progress: Option<ProgressCache>,
    events: Vec<PlaybackEvent>,
    weak_self: Weak<Shared>,
}

impl Session {
    fn new(
        env: PlayerEnvironment,
        target: MountTarget,
        config: PlayerConfig,
        weak_self: Weak<Shared>,
    ) -> Self {
        Self {
            env,
            target,
            state: PlaybackState::Unstarted,
            media: config.initial_media.clone(),
            position_seconds: 0.0,
            duration_seconds: 0.0,
            muted: config.muted,
            live: true,
            player: None,
            subscription: None,
            lease: None,
            poll: None,
            generation: 0,
            loop_seek_pending: false,
            progress: config.track_progress.then(ProgressCache::new),
            events: Vec::new(),
            weak_self,
            config,
        }
    }

    // ===== Attachment =====

    fn create_player(&mut self) {
        if !self.live || self.state != PlaybackState::Unstarted || self.player.is_some() {
            return;
        }

        let mut options = self.config.attach_options();
        options.muted = self.muted;
        let sink = NoticeSink {
            shared: self.weak_self.clone(),
        };

        match self
            .env
            .library
            .create_player(&self.target, &self.media, options, sink)
        {
            Ok(player) => {
                debug!("Player attached to {} with {}", self.target, self.media);
                self.player = Some(player);
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        if !self.live || self.state == PlaybackState::Error {
            return;
        }

        warn!("Playback session on {} failed: {}", self.target, error);
        self.poll = None;
        self.set_state(PlaybackState::Error);
        self.events.push(PlaybackEvent::Error {
            message: error.to_string(),
        });
    }

    // ===== Commands =====

    fn toggle_play_pause(&mut self) {
        if !self.live {
            return;
        }

        match self.state {
            PlaybackState::Playing => self.request_pause(),
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Ended => {
                self.request_play();
            }
            PlaybackState::Unstarted | PlaybackState::Error => {}
        }
    }

    fn request_play(&mut self) {
        let restart_at = match (self.state, self.config.loop_window) {
            (PlaybackState::Ended, Some(window)) => Some(window.start_seconds()),
            (PlaybackState::Ended, None) => Some(0.0),
            _ => None,
        };

        let Some(player) = self.player.as_mut() else {
            return;
        };
        if let Some(position) = restart_at {
            player.seek_to(position);
            self.position_seconds = position;
        }
        player.play();
        self.set_state(PlaybackState::Playing);
    }

    fn request_pause(&mut self) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        player.pause();
        self.poll = None;
        self.loop_seek_pending = false;
        self.set_state(PlaybackState::Paused);
    }

    fn toggle_mute(&mut self) {
        if !self.live || self.state == PlaybackState::Error {
            return;
        }

        self.muted = !self.muted;
        if let Some(player) = self.player.as_mut() {
            if self.muted {
                player.mute();
            } else {
                player.unmute();
            }
        }
        self.events.push(PlaybackEvent::MuteChanged { muted: self.muted });
    }

    fn seek_fraction(&mut self, fraction: f64) {
        if !self.live
            || !self.state.is_attached()
            || self.duration_seconds <= 0.0
            || !fraction.is_finite()
        {
            return;
        }
        let Some(player) = self.player.as_mut() else {
            return;
        };

        let target = fraction.clamp(0.0, 1.0) * self.duration_seconds;
        player.seek_to(target);
        self.position_seconds = target;
        self.loop_seek_pending = false;
        self.record_progress();
        self.emit_position();
    }

    fn switch_media(&mut self, media: MediaRef) {
        if !self.live || !self.state.is_attached() || self.player.is_none() {
            return;
        }

        if media == self.media {
            self.toggle_play_pause();
            return;
        }

        // Old item's timer goes first so no tick can write under the new key
        self.poll = None;
        self.loop_seek_pending = false;

        let previous = std::mem::replace(&mut self.media, media.clone());
        if let Some(player) = self.player.as_mut() {
            player.load_media(&media);
        }
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
        if let Some(cache) = self.progress.as_mut() {
            cache.seed(&media);
        }

        debug!("Switched {} -> {}", previous, media);
        self.events.push(PlaybackEvent::MediaChanged { media, previous });
        self.set_state(PlaybackState::Ready);
        self.request_play();
    }

    fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;

        self.poll = None;
        if let Some(mut player) = self.player.take() {
            player.destroy();
        }
        if let Some(id) = self.subscription.take() {
            self.env.loader.unsubscribe(id);
        }
        self.lease = None;
        debug!("Playback session on {} torn down", self.target);
    }

    // ===== Notices =====

    fn apply_notice(&mut self, notice: PlayerNotice) {
        if !self.live || self.state == PlaybackState::Error {
            trace!("Ignoring {:?} for inactive session", notice);
            return;
        }

        match notice {
            PlayerNotice::Ready => self.on_ready(),
            PlayerNotice::StateChanged(state) => self.on_player_state(state),
            PlayerNotice::Error(code) => self.fail(PlaybackError::Player { code }),
        }
    }

    fn on_ready(&mut self) {
        if self.state != PlaybackState::Unstarted {
            return;
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };

        let duration = player.duration();
        let position = player.current_position();
        if duration.is_finite() && duration > 0.0 {
            self.duration_seconds = duration;
        }
        self.set_state(PlaybackState::Ready);

        if let Some(window) = self.config.loop_window {
            if window.needs_correction(position) {
                self.seek_to_loop_start(window);
            }
        }

        if self.config.autoplay {
            self.request_play();
        }
    }

    fn on_player_state(&mut self, reported: PlayerState) {
        match reported {
            PlayerState::Playing => {
                if self.state == PlaybackState::Unstarted {
                    return;
                }
                self.set_state(PlaybackState::Playing);
                self.start_polling();
            }
            PlayerState::Paused => {
                if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
                    self.poll = None;
                    self.set_state(PlaybackState::Paused);
                }
            }
            PlayerState::Ended => {
                if !matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
                    return;
                }
                self.set_state(PlaybackState::Ended);

                match self.config.loop_window {
                    Some(window) => {
                        // The interval may already have sent us back this tick
                        if !self.loop_seek_pending {
                            self.seek_to_loop_start(window);
                        }
                        if let Some(player) = self.player.as_mut() {
                            player.play();
                        }
                        self.set_state(PlaybackState::Playing);
                        self.start_polling();
                    }
                    None => self.poll = None,
                }
            }
            PlayerState::Unstarted | PlayerState::Buffering | PlayerState::Cued => {
                trace!("Player reported {:?}", reported);
            }
        }
    }

    // ===== Polling =====

    fn start_polling(&mut self) {
        if self.poll.is_some() || !self.live {
            return;
        }

        self.generation += 1;
        let ticket = PollTicket::new(self.generation, self.media.clone());
        let weak = self.weak_self.clone();
        let tick_ticket = ticket.clone();
        let handle = self.env.timers.every(
            self.config.poll_interval(),
            Box::new(move || Shared::on_tick(&weak, &tick_ticket)),
        );

        debug!("Polling {} every {:?}", self.media, self.config.poll_interval());
        self.poll = Some(PollTimer::new(handle, ticket));
    }

    fn poll(&mut self, ticket: &PollTicket) {
        if !self.live {
            return;
        }
        let current = self.poll.as_ref().map(PollTimer::ticket);
        if current != Some(ticket) || ticket.media() != &self.media {
            trace!("Discarding stale tick for {}", ticket.media());
            return;
        }
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };

        let reported_duration = player.duration();
        let reported_position = player.current_position();

        if reported_duration.is_finite() && reported_duration > 0.0 {
            self.duration_seconds = reported_duration;
        }
        let mut position = if reported_position.is_finite() {
            reported_position.max(0.0)
        } else {
            self.position_seconds
        };
        if self.duration_seconds > 0.0 {
            position = position.min(self.duration_seconds);
        }
        self.position_seconds = position;

        self.loop_seek_pending = false;
        if let Some(window) = self.config.loop_window {
            if window.needs_correction(position) {
                self.seek_to_loop_start(window);
            }
        }

        self.record_progress();
        self.emit_position();
    }

    fn seek_to_loop_start(&mut self, window: LoopWindow) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        let start = window.start_seconds();
        player.seek_to(start);
        self.position_seconds = start;
        self.loop_seek_pending = true;

        let media = &self.media;
        self.events.retain(
            |e| !matches!(e, PlaybackEvent::LoopRestarted { media: pending, .. } if pending == media),
        );
        self.events.push(PlaybackEvent::LoopRestarted {
            media: self.media.clone(),
            start_seconds: start,
        });
    }

    // ===== Helpers =====

    fn record_progress(&mut self) {
        if let Some(cache) = self.progress.as_mut() {
            cache.record(&self.media, self.position_seconds, self.duration_seconds);
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        debug!("{}: {:?} -> {:?}", self.target, self.state, state);
        self.state = state;
        self.events.push(PlaybackEvent::StateChanged { state });
    }

    /// Queue a position update, replacing one still pending for this media
    fn emit_position(&mut self) {
        let media = &self.media;
        self.events.retain(
            |e| !matches!(e, PlaybackEvent::PositionUpdate { media: pending, .. } if pending == media),
        );
        self.events.push(PlaybackEvent::PositionUpdate {
            media: self.media.clone(),
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
        });
    }
}
