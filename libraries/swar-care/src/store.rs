//! Care record persistence

use crate::error::{CareError, Result};
use crate::schedule::CareSchedule;
use crate::types::{CareRecord, NewCareRecord, OwnerId, RecordId};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Persistence contract for care records
///
/// Every operation is scoped to an owner: records belonging to someone else
/// behave as if they did not exist.
#[async_trait]
pub trait CareStore: Send + Sync {
    /// All records of `owner`, newest first
    async fn list(&self, owner: &OwnerId) -> Result<Vec<CareRecord>>;

    async fn get(&self, id: &RecordId, owner: &OwnerId) -> Result<Option<CareRecord>>;

    /// Register an instrument; care dates are derived from the purchase date
    async fn create(&self, owner: &OwnerId, input: NewCareRecord) -> Result<CareRecord>;

    /// Replace a record's details and recompute its care dates
    async fn update(
        &self,
        id: &RecordId,
        owner: &OwnerId,
        input: NewCareRecord,
    ) -> Result<CareRecord>;

    async fn delete(&self, id: &RecordId, owner: &OwnerId) -> Result<()>;
}

/// In-memory [`CareStore`]
#[derive(Debug, Default)]
pub struct MemoryCareStore {
    records: RwLock<Vec<CareRecord>>,
    schedule: CareSchedule,
}

impl MemoryCareStore {
    pub fn new(schedule: CareSchedule) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            schedule,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CareStore for MemoryCareStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<CareRecord>> {
        let records = self.records.read().await;

        // Reverse insertion order first so equal timestamps keep newest first
        let mut owned: Vec<CareRecord> = records
            .iter()
            .rev()
            .filter(|r| &r.owner_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get(&self, id: &RecordId, owner: &OwnerId) -> Result<Option<CareRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| &r.id == id && &r.owner_id == owner)
            .cloned())
    }

    async fn create(&self, owner: &OwnerId, input: NewCareRecord) -> Result<CareRecord> {
        let input = input.normalized()?;
        let record = CareRecord {
            id: RecordId::generate(),
            owner_id: owner.clone(),
            kind: input.kind,
            warranty_expiry: self.schedule.warranty_expiry(input.purchase_date)?,
            next_tuning: self.schedule.next_tuning(input.purchase_date)?,
            name: input.name,
            purchase_date: input.purchase_date,
            purchase_location: input.purchase_location,
            created_at: Utc::now(),
        };

        self.records.write().await.push(record.clone());
        info!("Registered {} {} for {}", record.kind, record.id, owner);
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        owner: &OwnerId,
        input: NewCareRecord,
    ) -> Result<CareRecord> {
        let input = input.normalized()?;
        let warranty_expiry = self.schedule.warranty_expiry(input.purchase_date)?;
        let next_tuning = self.schedule.next_tuning(input.purchase_date)?;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| &r.id == id && &r.owner_id == owner)
            .ok_or_else(|| CareError::not_found(id))?;

        record.kind = input.kind;
        record.name = input.name;
        record.purchase_date = input.purchase_date;
        record.purchase_location = input.purchase_location;
        record.warranty_expiry = warranty_expiry;
        record.next_tuning = next_tuning;

        debug!("Updated care record {}", id);
        Ok(record.clone())
    }

    async fn delete(&self, id: &RecordId, owner: &OwnerId) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(&r.id == id && &r.owner_id == owner));

        if records.len() == before {
            return Err(CareError::not_found(id));
        }
        info!("Deleted care record {}", id);
        Ok(())
    }
}
