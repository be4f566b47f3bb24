//! Warranty and tuning schedule derivation
//!
//! Care dates are derived from the purchase date by whole-month offsets.
//! Month arithmetic clamps to the last day of the target month, so a
//! purchase on 31 August is due for tuning on 28/29 February.

use crate::error::{CareError, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Care schedule configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareConfig {
    /// Warranty length in months (default: 12)
    #[serde(default = "default_warranty_months")]
    pub warranty_months: u32,

    /// Months between tunings (default: 6)
    #[serde(default = "default_tuning_interval_months")]
    pub tuning_interval_months: u32,
}

fn default_warranty_months() -> u32 {
    12
}

fn default_tuning_interval_months() -> u32 {
    6
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            warranty_months: default_warranty_months(),
            tuning_interval_months: default_tuning_interval_months(),
        }
    }
}

impl CareConfig {
    /// Load from `care.toml` (if present) with `SWAR_CARE_*` overrides
    pub fn load() -> Result<Self> {
        Self::load_from(&PathBuf::from("care.toml"))
    }

    /// Load from a specific file (skipped if missing) with `SWAR_CARE_*` overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        // e.g. SWAR_CARE_WARRANTY_MONTHS=24
        settings =
            settings.add_source(config::Environment::with_prefix("SWAR_CARE").try_parsing(true));

        let config: Self = settings
            .build()
            .map_err(|e| CareError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CareError::Config(e.to_string()))?;

        config.validate()?;
        debug!(
            "Care schedule: warranty {} months, tuning every {} months",
            config.warranty_months, config.tuning_interval_months
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warranty_months == 0 {
            return Err(CareError::Config("warranty_months must be positive".to_string()));
        }
        if self.tuning_interval_months == 0 {
            return Err(CareError::Config(
                "tuning_interval_months must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derives care dates from a purchase date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareSchedule {
    warranty: Months,
    tuning: Months,
}

impl CareSchedule {
    pub fn new(config: &CareConfig) -> Self {
        Self {
            warranty: Months::new(config.warranty_months),
            tuning: Months::new(config.tuning_interval_months),
        }
    }

    pub fn warranty_expiry(&self, purchase: NaiveDate) -> Result<NaiveDate> {
        add_months(purchase, self.warranty)
    }

    pub fn next_tuning(&self, purchase: NaiveDate) -> Result<NaiveDate> {
        add_months(purchase, self.tuning)
    }
}

impl Default for CareSchedule {
    fn default() -> Self {
        Self::new(&CareConfig::default())
    }
}

fn add_months(date: NaiveDate, months: Months) -> Result<NaiveDate> {
    date.checked_add_months(months)
        .ok_or_else(|| CareError::invalid(format!("date out of range: {}", date)))
}
