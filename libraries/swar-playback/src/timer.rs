//! Polling timers
//!
//! A controller acquires one repeating timer while playback is confirmed and
//! releases it as soon as playback stops. The timer is a scoped resource:
//! dropping a [`PollTimer`] cancels it, so a session that goes away can never
//! leave a live timer behind.

use crate::types::MediaRef;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Source of repeating timers (browser intervals, a host frame loop, tests)
pub trait TimerSource {
    /// Call `tick` every `period` until the returned handle is cancelled
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn TimerHandle>;
}

/// Cancellation handle for a timer started by a [`TimerSource`]
pub trait TimerHandle {
    /// Stop the timer; must be idempotent
    fn cancel(&mut self);
}

/// Identity of a polling run, captured when the timer starts
///
/// A tick whose ticket does not match the session's live timer and current
/// media is stale and must not write progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    generation: u64,
    media: MediaRef,
}

impl PollTicket {
    pub(crate) fn new(generation: u64, media: MediaRef) -> Self {
        Self { generation, media }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn media(&self) -> &MediaRef {
        &self.media
    }
}

/// A live polling timer; cancelled on drop
pub(crate) struct PollTimer {
    handle: Box<dyn TimerHandle>,
    ticket: PollTicket,
}

impl PollTimer {
    pub(crate) fn new(handle: Box<dyn TimerHandle>, ticket: PollTicket) -> Self {
        Self { handle, ticket }
    }

    pub(crate) fn ticket(&self) -> &PollTicket {
        &self.ticket
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

struct TimerSlot {
    id: u64,
    period: Duration,
    tick: Option<Box<dyn FnMut()>>,
    cancelled: Rc<Cell<bool>>,
}

/// Timer source driven explicitly by the host
///
/// Nothing fires on its own: the host calls [`ManualTimers::fire`] from its
/// own loop. Used by native hosts and by tests that need deterministic ticks.
#[derive(Clone, Default)]
pub struct ManualTimers {
    slots: Rc<RefCell<Vec<TimerSlot>>>,
    next_id: Rc<Cell<u64>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live timer once, returns how many fired
    pub fn fire(&self) -> usize {
        let ids: Vec<u64> = self
            .slots
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .map(|slot| slot.id)
            .collect();

        let mut fired = 0;
        for id in ids {
            // Take the callback out so it can cancel timers (including itself)
            let tick = self
                .slots
                .borrow_mut()
                .iter_mut()
                .find(|slot| slot.id == id && !slot.cancelled.get())
                .and_then(|slot| slot.tick.take());

            if let Some(mut tick) = tick {
                tick();
                fired += 1;

                if let Some(slot) = self.slots.borrow_mut().iter_mut().find(|s| s.id == id) {
                    slot.tick = Some(tick);
                }
            }
        }

        self.slots.borrow_mut().retain(|slot| !slot.cancelled.get());
        fired
    }

    /// Number of timers that have not been cancelled
    pub fn active(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .count()
    }

    /// Periods of the live timers, in start order
    pub fn periods(&self) -> Vec<Duration> {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .map(|slot| slot.period)
            .collect()
    }
}

impl TimerSource for ManualTimers {
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn TimerHandle> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let cancelled = Rc::new(Cell::new(false));
        self.slots.borrow_mut().push(TimerSlot {
            id,
            period,
            tick: Some(tick),
            cancelled: Rc::clone(&cancelled),
        });

        Box::new(ManualTimerHandle {
            id,
            cancelled,
            slots: Rc::downgrade(&self.slots),
        })
    }
}

struct ManualTimerHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
    slots: Weak<RefCell<Vec<TimerSlot>>>,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&mut self) {
        self.cancelled.set(true);

        // While firing, the slot list is cleaned up after the round instead
        if let Some(slots) = self.slots.upgrade() {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.retain(|slot| slot.id != self.id);
            }
        }
    }
}
