//! Browser intervals for position polling

use crate::timer::{TimerHandle, TimerSource};
use gloo_timers::callback::{Interval, Timeout};
use std::time::Duration;

/// [`TimerSource`] backed by `setInterval`
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimers;

impl TimerSource for GlooTimers {
    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Box<dyn TimerHandle> {
        let millis = period.as_millis().clamp(1, u32::MAX as u128) as u32;
        Box::new(GlooTimerHandle {
            interval: Some(Interval::new(millis, tick)),
        })
    }
}

struct GlooTimerHandle {
    interval: Option<Interval>,
}

impl TimerHandle for GlooTimerHandle {
    fn cancel(&mut self) {
        if let Some(interval) = self.interval.take() {
            // The cancel may come from inside this interval's own tick, so the
            // closure outlives the current call stack
            let closure = interval.cancel();
            Timeout::new(0, move || drop(closure)).forget();
        }
    }
}

impl Drop for GlooTimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
