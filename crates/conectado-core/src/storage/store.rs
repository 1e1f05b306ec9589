use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read storage file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed, string-valued persistent storage.
///
/// Implementations are synchronous and shared by reference; mutation goes
/// through `&self`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key-value store backed by one JSON object file.
///
/// Every mutation rewrites the whole file. A missing file reads as empty, and
/// so does a corrupt one (with a warning) so that a damaged file never blocks
/// startup.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store whose file lives in `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self::at_path(data_dir.join(STORAGE_FILE))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the file is still usable
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is corrupt, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
            key: STORAGE_FILE.to_string(),
            source,
        })?;

        // Write to a sibling file and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents).map_err(write_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut entries = self.read_all()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)?;
        debug!(key, "Removed value");
        Ok(())
    }
}

/// In-memory key-value store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get("auth_token").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set("auth_token", "abc").unwrap();
        store.set("user", r#"{"id":"1"}"#).unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));

        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
        assert_eq!(store.get("user").unwrap().as_deref(), Some(r#"{"id":"1"}"#));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        FileStore::new(dir.path()).set("auth_token", "abc").unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.get("user").unwrap(), None);

        // Writing recovers the file
        store.set("user", "x").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_store_remove_missing_key_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.remove("auth_token").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
