//! Persistent key-value storage.
//!
//! # Data Flow
//! ```text
//! CredentialStore  ──┐
//! ErrorReporter    ──┼──▶ KeyValueStore (trait)
//! TtlCache         ──┘        ├── MemoryStore (tests, ephemeral sessions)
//!                             └── FileStore (JSON document on disk)
//! ```
//!
//! # Design Decisions
//! - Synchronous API: entries are small and every caller already holds its value
//! - Values are `serde_json::Value` so each owner picks its own shape
//! - Writes are flushed immediately; there is no background sync

pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur while persisting entries.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A string-keyed store of JSON values.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored.
    fn keys(&self) -> Vec<String>;
}

/// Read a typed value, treating undecodable entries as absent.
pub fn get_typed<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Ignoring undecodable storage entry");
            None
        }
    }
}

/// Encode and store a typed value.
pub fn set_typed<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    store.set(key, serde_json::to_value(value)?)
}
