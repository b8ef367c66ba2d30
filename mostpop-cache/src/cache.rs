//! In-memory store of serialized, timestamped payloads.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use mostpop_core::constants::DEFAULT_CACHE_MAX_ENTRIES;
use mostpop_core::error::Result;

use crate::entry::CacheEntry;

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before the least recently used is dropped
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Response cache shared by every repository call.
///
/// Access is serialized at the store boundary: callers suspend while waiting
/// for the lock and need no synchronization of their own. Entries may be
/// evicted at any time once the store is full, so absence is always a normal
/// outcome.
///
/// Nothing here ever fails observably. Encoding failures drop the write and
/// decoding failures (including reading a key as the wrong type) are misses.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<LruCache<String, Arc<[u8]>>>,
    config: CacheConfig,
}

impl ResponseCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stores `value` under `key`, stamped with the current instant.
    pub async fn put<V: Serialize>(&self, key: &str, value: V) {
        self.put_entry(key, &CacheEntry::new(value)).await;
    }

    /// Stores a pre-built entry, keeping its creation time.
    ///
    /// Used to prime the cache, e.g. with an already stale entry.
    pub async fn put_entry<V: Serialize>(&self, key: &str, entry: &CacheEntry<V>) {
        let bytes = match encode(entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode response for caching");
                return;
            }
        };

        self.entries.lock().await.put(key.to_string(), bytes);
        debug!(key, "Cached response");
    }

    /// Reads the entry under `key` as type `V`.
    ///
    /// Returns `None` if the key was never written, was evicted, or holds a
    /// payload that does not decode as `V`.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<V>> {
        let bytes = self.entries.lock().await.get(key).cloned()?;

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(key, error = %e, "Cached payload does not match requested type");
                None
            }
        }
    }

    /// Drops all entries.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

fn encode<V: Serialize>(entry: &CacheEntry<V>) -> Result<Arc<[u8]>> {
    Ok(serde_json::to_vec(entry)?.into())
}
