//! Persisted Session Store
//!
//! Durable key/value storage for the signed-in user. The record is kept as
//! serialized JSON under [`keys::USER`]; a bearer token, when the backend
//! issued one, is mirrored under [`keys::AUTH_TOKEN`].
//!
//! The store is only ever read or written by the auth session manager.
//! [`MemorySessionStore`] backs tests and embedded use, [`FileSessionStore`]
//! keeps the session across process restarts.

use crate::shared::SessionRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Fixed storage keys
pub mod keys {
    /// Serialized `SessionRecord`
    pub const USER: &str = "user";

    /// Bearer token issued at login
    pub const AUTH_TOKEN: &str = "authToken";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize session: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data exists but cannot be parsed
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Key/value storage holding the current session.
pub trait SessionStore: Send + Sync {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read the stored record. A token kept only under the token key is
    /// folded back into the record.
    fn load_session(&self) -> Result<Option<SessionRecord>, StoreError> {
        let Some(raw) = self.load_raw(keys::USER)? else {
            return Ok(None);
        };
        let mut record: SessionRecord =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if record.email.trim().is_empty() {
            return Err(StoreError::Corrupt("record has no email".to_string()));
        }
        if record.token.is_none() {
            record.token = self.load_raw(keys::AUTH_TOKEN)?.filter(|t| !t.is_empty());
        }
        Ok(Some(record))
    }

    fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.save_raw(keys::USER, &raw)?;
        match &record.token {
            Some(token) => self.save_raw(keys::AUTH_TOKEN, token),
            None => self.remove(keys::AUTH_TOKEN),
        }
    }

    fn clear_session(&self) -> Result<(), StoreError> {
        self.remove(keys::USER)?;
        self.remove(keys::AUTH_TOKEN)
    }
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Writes go to a sibling temp file which is then renamed over the target.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply an edit to the stored map. A corrupt file is replaced.
    fn update(&self, edit: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "replacing corrupt session file");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        edit(&mut entries);
        self.write_all(&entries)
    }
}

impl SessionStore for FileSessionStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
