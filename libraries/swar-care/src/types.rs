//! Care record types

use crate::error::{CareError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Care record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random record ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of care records (one per signed-in user)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner ID from a stored value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random owner ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument families the care hub tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Sitar,
    Sarod,
    Tabla,
    Santoor,
    Bansuri,
    Harmonium,
    Other,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 7] = [
        Self::Sitar,
        Self::Sarod,
        Self::Tabla,
        Self::Santoor,
        Self::Bansuri,
        Self::Harmonium,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sitar => "Sitar",
            Self::Sarod => "Sarod",
            Self::Tabla => "Tabla",
            Self::Santoor => "Santoor",
            Self::Bansuri => "Bansuri",
            Self::Harmonium => "Harmonium",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentKind {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CareError::invalid(format!("unknown instrument type: {}", s)))
    }
}

/// A registered instrument with its derived care dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub kind: InstrumentKind,
    pub name: String,
    pub purchase_date: NaiveDate,
    pub purchase_location: Option<String>,
    pub warranty_expiry: NaiveDate,
    pub next_tuning: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl CareRecord {
    /// Warranty is active through its expiry day
    pub fn warranty_status(&self, today: NaiveDate) -> WarrantyStatus {
        if today <= self.warranty_expiry {
            WarrantyStatus::Active
        } else {
            WarrantyStatus::Expired
        }
    }

    /// Tuning falls due on the scheduled day
    pub fn tuning_status(&self, today: NaiveDate) -> TuningStatus {
        if today >= self.next_tuning {
            TuningStatus::Due
        } else {
            TuningStatus::Upcoming
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuningStatus {
    Due,
    Upcoming,
}

/// Data for registering or editing an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCareRecord {
    pub kind: InstrumentKind,
    pub name: String,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub purchase_location: Option<String>,
}

impl NewCareRecord {
    pub fn new(kind: InstrumentKind, name: impl Into<String>, purchase_date: NaiveDate) -> Self {
        Self {
            kind,
            name: name.into(),
            purchase_date,
            purchase_location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.purchase_location = Some(location.into());
        self
    }

    /// Trim text fields; a blank name is rejected, a blank location dropped
    pub fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CareError::invalid("instrument name is required"));
        }

        let purchase_location = self
            .purchase_location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Ok(Self {
            name,
            purchase_location,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn instrument_kind_parses_case_insensitively() {
        assert_eq!("sitar".parse::<InstrumentKind>().unwrap(), InstrumentKind::Sitar);
        assert_eq!(" Bansuri ".parse::<InstrumentKind>().unwrap(), InstrumentKind::Bansuri);
        assert!("veena".parse::<InstrumentKind>().is_err());
        assert_eq!(InstrumentKind::Harmonium.to_string(), "Harmonium");
    }

    #[test]
    fn normalized_trims_and_validates() {
        let input = NewCareRecord::new(InstrumentKind::Tabla, "  Pair of tablas ", date(2024, 3, 1))
            .with_location("   ");
        let normalized = input.normalized().unwrap();
        assert_eq!(normalized.name, "Pair of tablas");
        assert_eq!(normalized.purchase_location, None);

        let blank = NewCareRecord::new(InstrumentKind::Tabla, "  ", date(2024, 3, 1));
        assert!(matches!(blank.normalized(), Err(CareError::InvalidInput(_))));
    }

    #[test]
    fn status_boundaries_are_inclusive() {
        let record = CareRecord {
            id: RecordId::generate(),
            owner_id: OwnerId::generate(),
            kind: InstrumentKind::Sitar,
            name: "Ravi Shankar style".to_string(),
            purchase_date: date(2024, 1, 15),
            purchase_location: Some("Kolkata".to_string()),
            warranty_expiry: date(2025, 1, 15),
            next_tuning: date(2024, 7, 15),
            created_at: Utc::now(),
        };

        assert_eq!(record.warranty_status(date(2025, 1, 15)), WarrantyStatus::Active);
        assert_eq!(record.warranty_status(date(2025, 1, 16)), WarrantyStatus::Expired);
        assert_eq!(record.tuning_status(date(2024, 7, 14)), TuningStatus::Upcoming);
        assert_eq!(record.tuning_status(date(2024, 7, 15)), TuningStatus::Due);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(OwnerId::generate(), OwnerId::generate());
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}
