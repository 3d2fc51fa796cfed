//! TTL key-value cache.
//!
//! Entries live in a [`KeyValueStore`] as `{data, timestamp, expire}` under
//! a `cache:` prefix so clearing the cache never touches other state kept
//! in the same store (credential, error log).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::clock::{Clock, SystemClock};
use crate::storage::{self, KeyValueStore, StorageError};

/// TTL applied by [`TtlCache::set`].
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

const KEY_PREFIX: &str = "cache:";

/// Persisted shape of one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Time-to-live in milliseconds.
    pub expire: u64,
}

impl CacheEntry {
    /// Fresh while `now - timestamp <= expire`.
    pub fn is_fresh(&self, now_millis: u64) -> bool {
        now_millis.saturating_sub(self.timestamp) <= self.expire
    }
}

/// A cache whose entries expire lazily on read.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store `value` under `key` with the default TTL.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.set_with_ttl(key, value, DEFAULT_TTL)
    }

    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry {
            data: serde_json::to_value(value)?,
            timestamp: self.clock.now_millis(),
            expire: ttl.as_millis() as u64,
        };
        storage::set_typed(self.store.as_ref(), &storage_key(key), &entry)
    }

    /// Read `key`. Expired entries are removed and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let storage_key = storage_key(key);
        let entry: CacheEntry = storage::get_typed(self.store.as_ref(), &storage_key)?;

        if !entry.is_fresh(self.clock.now_millis()) {
            tracing::debug!(key = %key, "Cache entry expired");
            if let Err(e) = self.store.remove(&storage_key) {
                tracing::error!(key = %key, error = %e, "Failed to evict cache entry");
            }
            return None;
        }

        serde_json::from_value(entry.data).ok()
    }

    /// Remove one key, or every cache entry when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) -> Result<(), StorageError> {
        match key {
            Some(key) => self.store.remove(&storage_key(key)),
            None => {
                for k in self.store.keys() {
                    if k.starts_with(KEY_PREFIX) {
                        self.store.remove(&k)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn storage_key(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}
