//! House of Swar - Instrument Care
//!
//! Records of registered instruments with their derived warranty expiry and
//! tuning dates, and the owner-scoped persistence contract behind the care hub.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use swar_care::{CareStore, InstrumentKind, MemoryCareStore, NewCareRecord, OwnerId};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryCareStore::default();
//! let owner = OwnerId::generate();
//!
//! let purchase = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//! let sitar = store
//!     .create(&owner, NewCareRecord::new(InstrumentKind::Sitar, "Concert sitar", purchase))
//!     .await?;
//!
//! assert_eq!(sitar.warranty_expiry, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
//! assert_eq!(sitar.next_tuning, NaiveDate::from_ymd_opt(2024, 9, 10).unwrap());
//! # Ok::<(), swar_care::CareError>(())
//! # }).unwrap();
//! ```

mod error;
mod schedule;
mod store;
pub mod types;

pub use error::{CareError, Result};
pub use schedule::{CareConfig, CareSchedule};
pub use store::{CareStore, MemoryCareStore};
pub use types::{
    CareRecord, InstrumentKind, NewCareRecord, OwnerId, RecordId, TuningStatus, WarrantyStatus,
};
