//! Fusion history
//!
//! Every successful fusion is written to a `KeyValueStore` as a
//! `HistoryRecord` under `fusion-{uuid}`. Records never expire, so the
//! history store must not be shared with a store that gets purged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cache::{KeyValueStore, StoreError};
use crate::data::Composite;

/// Prefix of every history key
pub const HISTORY_KEY_PREFIX: &str = "fusion-";

/// TTL that saturates to the latest representable expiry
const RETAIN_FOREVER: u64 = u64::MAX;

/// One recorded fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub fusion_id: Uuid,
    /// When the fusion was recorded, as unix milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub composite: Composite,
}

impl HistoryRecord {
    /// Store key for this record
    pub fn key(&self) -> String {
        history_key(&self.fusion_id)
    }
}

/// Store key for the record with `fusion_id`
pub fn history_key(fusion_id: &Uuid) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, fusion_id)
}

/// Appends fusions to a history store
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Records `composite` under a fresh fusion id
    ///
    /// # Returns
    /// * `Ok(HistoryRecord)` - The record as written
    /// * `Err(StoreError)` - The record could not be encoded or stored
    pub async fn record(&self, composite: &Composite) -> Result<HistoryRecord, StoreError> {
        let record = HistoryRecord {
            fusion_id: Uuid::new_v4(),
            created_at: Utc::now(),
            composite: composite.clone(),
        };

        let payload = serde_json::to_value(&record)?;
        self.store.put(&record.key(), payload, RETAIN_FOREVER).await?;
        info!(fusion_id = %record.fusion_id, name = %composite.character.name, "fusion recorded");

        Ok(record)
    }
}
