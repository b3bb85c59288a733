//! Keyed autosave snapshots of a form's values with a fixed expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::StorageError;
use super::form::{FormController, Values};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveSnapshot {
    pub values: Values,
    pub saved_at: DateTime<Utc>,
}

/// Key/value text storage the snapshots are written to
pub trait SnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage owned by a page; dropped with it
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Writes and restores one form's snapshot under a caller-supplied key
#[derive(Debug)]
pub struct Autosave<S: SnapshotStorage> {
    storage: S,
    key: String,
    ttl: Duration,
}

impl<S: SnapshotStorage> Autosave<S> {
    pub fn new(storage: S, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&mut self, values: &Values, now: DateTime<Utc>) -> Result<(), StorageError> {
        let snapshot = AutosaveSnapshot {
            values: values.clone(),
            saved_at: now,
        };
        let json =
            serde_json::to_string(&snapshot).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.write(&self.key, &json)?;
        log::debug!("autosave `{}` written", self.key);
        Ok(())
    }

    /// Values saved less than `ttl` before `now`. Expired and unreadable
    /// entries are removed.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<Option<Values>, StorageError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(None);
        };

        let snapshot: AutosaveSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("autosave `{}` is corrupt, discarding: {}", self.key, e);
                self.storage.remove(&self.key)?;
                return Ok(None);
            }
        };

        if now - snapshot.saved_at >= self.ttl {
            log::info!("autosave `{}` expired, discarding", self.key);
            self.storage.remove(&self.key)?;
            return Ok(None);
        }

        Ok(Some(snapshot.values))
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }

    /// One interval tick: saves only a dirty form that is not submitting.
    /// Returns whether a snapshot was written.
    pub fn tick(&mut self, form: &FormController, now: DateTime<Utc>) -> Result<bool, StorageError> {
        if !form.is_dirty() || form.is_submitting() {
            return Ok(false);
        }
        self.save(form.values(), now)?;
        Ok(true)
    }
}
