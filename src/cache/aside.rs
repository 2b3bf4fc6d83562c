//! Cache-aside lookups over any `KeyValueStore`

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::store::KeyValueStore;

/// Time-to-live for every cached origin response, in seconds
pub const CACHE_TTL_SECS: u64 = 1800;

/// Serves values from a store, fetching and storing them on a miss
///
/// The store is best-effort: a failed read counts as a miss and a failed write
/// only means the next call fetches again. Fetch failures are never cached.
/// Concurrent misses on one key each fetch and each write; the last write wins.
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn KeyValueStore>,
    ttl_secs: u64,
}

impl CacheAside {
    /// Creates a CacheAside over `store` using the standard TTL
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl_secs: CACHE_TTL_SECS,
        }
    }

    /// Overrides the TTL applied to new entries
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result
    ///
    /// # Arguments
    /// * `key` - Cache key identifying the fetch
    /// * `fetch` - Produces the origin request; only called on a miss
    ///
    /// # Returns
    /// * `Ok(T)` - From cache on a hit, from `fetch` on a miss
    /// * `Err(E)` - The fetch error, with nothing written to the store
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.lookup(key).await {
            return Ok(hit);
        }

        let value = fetch().await?;
        self.populate(key, &value).await;
        Ok(value)
    }

    /// Like `get_or_fetch`, for fetches that may report the value as unavailable
    ///
    /// `Ok(None)` from `fetch` is returned as-is and nothing is written.
    pub async fn get_or_fetch_optional<T, E, F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(hit) = self.lookup(key).await {
            return Ok(Some(hit));
        }

        let value = fetch().await?;
        if let Some(ref value) = value {
            self.populate(key, value).await;
        }
        Ok(value)
    }

    /// Reads a live entry for `key` and decodes it
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match self.store.get(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, fetching from origin");
                return None;
            }
        };

        if entry.is_expired() {
            debug!(key, expires_at = %entry.expires_at, "cache entry expired");
            return None;
        }

        match serde_json::from_value(entry.payload) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "cached payload has an unexpected shape, refetching");
                None
            }
        }
    }

    /// Writes a freshly fetched value; failures are logged and dropped
    async fn populate<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "could not encode value for cache");
                return;
            }
        };

        match self.store.put(key, payload, self.ttl_secs).await {
            Ok(()) => debug!(key, ttl_secs = self.ttl_secs, "cache populated"),
            Err(e) => warn!(key, error = %e, "cache write failed"),
        }
    }
}
