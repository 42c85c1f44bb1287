//! Durable key-value slots for client state.
//!
//! Each store serialises the part of its state it wants to keep into one JSON
//! string and saves it under a fixed slot name. Writes are best-effort: callers
//! log a failed save and carry on with the in-memory state.

use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;

pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, AppError>;

    fn save(&self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// One `<key>.json` file per slot under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Storage(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::Storage(format!("invalid storage key {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("cannot read {}: {}", path.display(), e))),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a truncated slot behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!("Saved {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage for tests and sessions that should not touch disk.
#[derive(Default)]
pub struct MemoryStorage {
    slots: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.get(key).map(|v| v.value().clone()))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Reads and decodes a slot. Missing or unreadable data yields `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn StateStorage, key: &str) -> Option<T> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read persisted state {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt persisted state {}: {}", key, e);
            None
        }
    }
}

/// Encodes and writes a slot, logging instead of failing.
pub fn save_json<T: Serialize>(storage: &dyn StateStorage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(AppError::from)
        .and_then(|raw| storage.save(key, &raw));
    if let Err(e) = result {
        warn!("Failed to persist state {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state")).unwrap();

        assert_eq!(storage.load("stock-storage").unwrap(), None);
        storage.save("stock-storage", r#"{"a":1}"#).unwrap();
        assert_eq!(storage.load("stock-storage").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(storage.dir().join("stock-storage.json").exists());

        storage.remove("stock-storage").unwrap();
        assert_eq!(storage.load("stock-storage").unwrap(), None);
        storage.remove("stock-storage").unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.save("../escape", "x").is_err());
        assert!(storage.load("").is_err());
    }

    #[test]
    fn test_load_json_ignores_corrupt_slot() {
        let storage = MemoryStorage::new();
        storage.save("auth-storage", "{not json").unwrap();
        let loaded: Option<serde_json::Value> = load_json(&storage, "auth-storage");
        assert!(loaded.is_none());

        save_json(&storage, "auth-storage", &serde_json::json!({"token": null}));
        let loaded: Option<serde_json::Value> = load_json(&storage, "auth-storage");
        assert_eq!(loaded, Some(serde_json::json!({"token": null})));
    }
}
