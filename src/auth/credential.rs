//! Process-wide bearer credential, owned and injectable.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::storage::{KeyValueStore, MemoryStore, StorageError};

/// Storage key of the persisted bearer token.
pub const TOKEN_KEY: &str = "token";

const EVENT_CAPACITY: usize = 16;

/// Why a credential was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Logout,
    Unauthorized,
}

/// Change notifications published by [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    Set,
    Cleared(ClearReason),
}

/// Holds at most one active bearer token.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    current: ArcSwapOption<String>,
    events: broadcast::Sender<CredentialEvent>,
}

impl CredentialStore {
    /// Create a store backed by `store`, picking up a previously persisted token.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let persisted = store
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|t| !t.is_empty());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            store,
            current: ArcSwapOption::new(persisted.map(Arc::new)),
            events,
        }
    }

    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The active token, if any.
    pub fn token(&self) -> Option<Arc<String>> {
        self.current.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    /// Persist and activate `token`. Nothing changes if persisting fails.
    pub fn set(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.store.set(TOKEN_KEY, serde_json::Value::String(token.clone()))?;
        self.current.store(Some(Arc::new(token)));
        tracing::debug!("Credential set");
        let _ = self.events.send(CredentialEvent::Set);
        Ok(())
    }

    /// Drop the active token.
    pub fn clear(&self, reason: ClearReason) {
        self.current.store(None);
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            tracing::error!(error = %e, "Failed to remove persisted credential");
        }
        tracing::info!(reason = ?reason, "Credential cleared");
        let _ = self.events.send(CredentialEvent::Cleared(reason));
    }

    /// Receive every subsequent change.
    pub fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
