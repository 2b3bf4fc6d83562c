//! Cache module for storing origin responses
//!
//! This module provides the `KeyValueStore` abstraction with a file-backed and an
//! in-memory implementation, and the `CacheAside` primitive that serves from the
//! store when it can and falls back to the origin when it must. Entries carry an
//! expiry timestamp; stores return expired entries untouched and `CacheAside`
//! treats them as misses.

mod aside;
mod file;
pub mod keys;
mod memory;
mod store;

pub use aside::{CacheAside, CACHE_TTL_SECS};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{CacheEntry, KeyValueStore, StoreError};
