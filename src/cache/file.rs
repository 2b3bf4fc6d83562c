//! File-backed key-value store
//!
//! Persists each cache entry as a JSON file in an XDG-compliant cache directory.
//! File names are the SHA-256 of the key, since keys may embed full URLs; the
//! original key is kept inside the entry so `scan` can report it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use directories::ProjectDirs;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use super::store::{CacheEntry, KeyValueStore, StoreError};

/// Suffix for temporary files so concurrent writers never share one
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Stores cache entries as JSON files on disk
///
/// Writes go to a temporary file first and are renamed into place, so a reader
/// sees either the previous entry or the new one. Expired files stay on disk
/// until `purge_expired` removes them.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore using the XDG cache directory
    ///
    /// Uses `~/.cache/holocast/` on Linux, or the equivalent path on other platforms.
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "holocast")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a FileStore in `name` under the XDG data directory
    ///
    /// For records that must survive cache purges, e.g.
    /// `~/.local/share/holocast/history/` on Linux.
    pub fn in_data_dir(name: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "holocast")?;
        let cache_dir = project_dirs.data_dir().join(name);
        Some(Self { cache_dir })
    }

    /// Creates a new FileStore rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// The directory holding the cache files
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.cache_dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Reads and decodes one cache file
    async fn read_entry(path: &Path) -> Result<Option<CacheEntry>, StoreError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Lists every `.json` file in the cache directory
    async fn entry_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Deletes every entry whose expiry has passed
    ///
    /// # Returns
    /// * `Ok(count)` - Number of entries removed
    /// * `Err(StoreError)` - If the cache directory cannot be read
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut removed = 0;

        for path in self.entry_paths().await? {
            match Self::read_entry(&path).await {
                Ok(Some(entry)) if entry.is_expired_at(now) => {
                    fs::remove_file(&path).await?;
                    removed += 1;
                }
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable cache file"),
            }
        }

        Ok(removed)
    }
}

/// Writes `contents` to `tmp` and renames it over `path`
///
/// `tmp` is removed whenever either step fails.
async fn replace_file(tmp: &Path, path: &Path, contents: String) -> std::io::Result<()> {
    let result = match fs::write(tmp, contents).await {
        Ok(()) => fs::rename(tmp, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = fs::remove_file(tmp).await;
    }
    result
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let entry = Self::read_entry(&self.cache_path(key)).await?;
        // A digest collision would surface here as a foreign key
        Ok(entry.filter(|entry| entry.key == key))
    }

    async fn put(&self, key: &str, payload: Value, ttl_secs: u64) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let entry = CacheEntry::new(key, payload, Utc::now(), ttl_secs);
        let json = serde_json::to_string_pretty(&entry)?;

        let path = self.cache_path(key);
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));

        replace_file(&tmp, &path, json).await?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<CacheEntry>, StoreError> {
        let mut entries = Vec::new();
        for path in self.entry_paths().await? {
            match Self::read_entry(&path).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable cache file"),
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
