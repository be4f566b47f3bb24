//! Per-item progress memory for multi-item players

use crate::types::MediaRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last observed position and duration of one media item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub position_seconds: f64,
    pub duration_seconds: f64,
}

impl Progress {
    pub fn new(position_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            position_seconds,
            duration_seconds,
        }
    }

    /// Fraction played in `[0, 1]`, 0 while the duration is unknown
    pub fn fraction(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.position_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Media item → last known progress
///
/// Entries are never evicted; the set of playable items is small and fixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressCache {
    entries: HashMap<MediaRef, Progress>,
}

impl ProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, media: &MediaRef) -> Option<Progress> {
        self.entries.get(media).copied()
    }

    /// Create an empty entry for an item played for the first time
    pub fn seed(&mut self, media: &MediaRef) {
        self.entries.entry(media.clone()).or_default();
    }

    /// Record a position; a zero duration keeps the previously known one
    pub fn record(&mut self, media: &MediaRef, position_seconds: f64, duration_seconds: f64) {
        let entry = self.entries.entry(media.clone()).or_default();
        entry.position_seconds = position_seconds;
        if duration_seconds > 0.0 {
            entry.duration_seconds = duration_seconds;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MediaRef, &Progress)> {
        self.entries.iter()
    }
}

/// Format seconds as `m:ss` for progress labels
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
