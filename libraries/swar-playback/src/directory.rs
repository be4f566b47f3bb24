//! Call-site lookup from content items to playable media
//!
//! Content items (ragas, lessons) without a playable reference are rejected
//! here, before a controller is ever asked to load them.

use crate::error::{PlaybackError, Result};
use crate::types::MediaRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Content item id → playable media
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDirectory {
    entries: HashMap<String, MediaRef>,
}

impl MediaDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from `(item id, media id)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut directory = Self::new();
        for (item, media) in pairs {
            directory.insert(item, media)?;
        }
        Ok(directory)
    }

    pub fn insert(&mut self, item_id: impl Into<String>, media_id: impl Into<String>) -> Result<()> {
        let media = MediaRef::new(media_id)?;
        self.entries.insert(item_id.into(), media);
        Ok(())
    }

    /// Playable media for an item, `MediaUnavailable` if it has none
    pub fn resolve(&self, item_id: &str) -> Result<&MediaRef> {
        self.entries
            .get(item_id)
            .ok_or_else(|| PlaybackError::MediaUnavailable(item_id.to_string()))
    }

    pub fn is_playable(&self, item_id: &str) -> bool {
        self.entries.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Part of the day that selects the daily listening pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaySegment {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DaySegment {
    /// Segment for a local hour (0-23); morning 5-11, afternoon 12-16, evening 17-20
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}
