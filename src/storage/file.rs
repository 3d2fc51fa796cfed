//! JSON-file backed store.
//!
//! The whole map is rewritten on every mutation through a temporary file
//! and a rename, so a crash never leaves a half-written document.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::storage::{KeyValueStore, StorageError};

/// A store persisted as a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<DashMap<String, serde_json::Value>>,
    path: PathBuf,
    // Serializes flushes so two writers never interleave temp files.
    flush_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let inner = DashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let map: HashMap<String, serde_json::Value> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                inner.insert(k, v);
            }
            tracing::debug!(path = %path.display(), entries = inner.len(), "Loaded storage file");
        }

        Ok(Self {
            inner: Arc::new(inner),
            path,
            flush_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Roll back an unflushed mutation so memory matches the file.
    fn restore(&self, key: &str, previous: Option<serde_json::Value>) {
        match previous {
            Some(value) => {
                self.inner.insert(key.to_string(), value);
            }
            None => {
                self.inner.remove(key);
            }
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        let _guard = self
            .flush_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let previous = self.inner.insert(key.to_string(), value);
        self.flush().inspect_err(|_| self.restore(key, previous))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if let Some((_, previous)) = self.inner.remove(key) {
            self.flush()
                .inspect_err(|_| self.restore(key, Some(previous)))?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.inner.iter().map(|r| r.key().clone()).collect()
    }
}
