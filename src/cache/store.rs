//! The key-value contract every cache backend implements

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a cache backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be encoded or decoded
    #[error("Cache entry could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single cached payload and its expiry metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The logical key this payload was stored under
    pub key: String,
    /// The cached value, opaque to the store
    pub payload: Value,
    /// When the payload was written
    pub cached_at: DateTime<Utc>,
    /// When the payload stops being a valid hit, as a unix timestamp
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Builds an entry written at `now` that lives for `ttl_secs` seconds
    ///
    /// A TTL reaching past the representable range expires at
    /// `DateTime::<Utc>::MAX_UTC`.
    pub fn new(key: impl Into<String>, payload: Value, now: DateTime<Utc>, ttl_secs: u64) -> Self {
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key: key.into(),
            payload,
            cached_at: now,
            expires_at,
        }
    }

    /// Whether the entry has expired as of `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the entry has expired as of the current time
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// A durable key-value backend with advisory expiry
///
/// Implementations must make single-key `put` and `get` atomic with respect to
/// each other. They are not required to hide expired entries; callers decide
/// what an expired entry means.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the entry stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Stores `payload` under `key`, replacing any previous entry
    async fn put(&self, key: &str, payload: Value, ttl_secs: u64) -> Result<(), StoreError>;

    /// Returns every stored entry, ordered by key
    async fn scan(&self) -> Result<Vec<CacheEntry>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_entry_expiry_is_ttl_after_write() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", json!(1), now, 1800);

        assert_eq!(entry.expires_at - entry.cached_at, Duration::seconds(1800));
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::seconds(1800)));
        assert!(entry.is_expired_at(now + Duration::seconds(1801)));
    }

    #[test]
    fn test_expires_at_serializes_as_unix_timestamp() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let entry = CacheEntry::new("weather-Hoth", json!({"a": 1}), now, 1800);

        let value = serde_json::to_value(&entry).expect("Failed to serialize entry");

        assert_eq!(value["expires_at"], json!(1_700_001_800));
        assert_eq!(value["key"], json!("weather-Hoth"));
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_overflowing() {
        let now = Utc::now();

        for ttl_secs in [100_000_000_000_000_000, i64::MAX as u64, u64::MAX] {
            let entry = CacheEntry::new("k", json!(1), now, ttl_secs);

            assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
            assert!(!entry.is_expired_at(now));
        }
    }

    #[test]
    fn test_saturated_expiry_survives_serialization() {
        let entry = CacheEntry::new("history", json!(1), Utc::now(), u64::MAX);

        let json = serde_json::to_string(&entry).expect("Failed to serialize entry");
        let decoded: CacheEntry = serde_json::from_str(&json).expect("Failed to decode entry");

        assert!(!decoded.is_expired());
        assert_eq!(decoded.expires_at.timestamp(), DateTime::<Utc>::MAX_UTC.timestamp());
    }
}
