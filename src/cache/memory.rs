//! In-process key-value store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;

use super::store::{CacheEntry, KeyValueStore, StoreError};

/// Keeps cache entries in a concurrent map for the lifetime of the process
///
/// Used by tests and by `--no-persist` runs. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry whose expiry has passed and returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, payload: Value, ttl_secs: u64) -> Result<(), StoreError> {
        let entry = CacheEntry::new(key, payload, Utc::now(), ttl_secs);
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<CacheEntry>, StoreError> {
        let mut entries: Vec<CacheEntry> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
