use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

type Encoder<T> = fn(&T) -> Result<String, serde_json::Error>;
type Decoder<T> = fn(&str) -> Option<T>;

/// A storage key bound to a value type and its encoding.
///
/// Reads never fail: a missing entry, an unreadable store, and a value that
/// does not decode all come back as `None`.
pub struct StorageKey<T> {
    name: &'static str,
    encode: Encoder<T>,
    decode: Decoder<T>,
}

impl<T> StorageKey<T> {
    pub fn new(name: &'static str, encode: Encoder<T>, decode: Decoder<T>) -> Self {
        Self { name, encode, decode }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self, store: &dyn KeyValueStore) -> Option<T> {
        let raw = match store.get(self.name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = self.name, error = %e, "Failed to read stored value");
                return None;
            }
        };

        let value = (self.decode)(&raw);
        if value.is_none() {
            debug!(key = self.name, "Discarding malformed stored value");
        }
        value
    }

    pub fn write(&self, store: &dyn KeyValueStore, value: &T) -> Result<(), StorageError> {
        let raw = (self.encode)(value).map_err(|source| StorageError::Encode {
            key: self.name.to_string(),
            source,
        })?;
        store.set(self.name, &raw)
    }

    pub fn clear(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(self.name)
    }
}

impl<T: Serialize + DeserializeOwned> StorageKey<T> {
    /// A key whose value is stored as JSON.
    pub fn json(name: &'static str) -> Self {
        Self::new(name, encode_json::<T>, decode_json::<T>)
    }
}

impl StorageKey<String> {
    /// A key whose value is stored verbatim. Empty strings read as absent.
    pub fn text(name: &'static str) -> Self {
        Self::new(name, encode_text, decode_text)
    }
}

impl<T> fmt::Debug for StorageKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageKey").field("name", &self.name).finish()
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw).ok()
}

#[allow(clippy::ptr_arg)]
fn encode_text(value: &String) -> Result<String, serde_json::Error> {
    Ok(value.clone())
}

fn decode_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        count: u32,
    }

    #[test]
    fn test_json_key_roundtrip() {
        let store = MemoryStore::new();
        let key = StorageKey::<Sample>::json("sample");

        let value = Sample { id: "a".to_string(), count: 3 };
        key.write(&store, &value).unwrap();

        assert_eq!(key.read(&store), Some(value));
    }

    #[test]
    fn test_json_key_malformed_reads_absent() {
        let store = MemoryStore::new();
        store.set("sample", "{\"id\": \"a\"").unwrap();

        let key = StorageKey::<Sample>::json("sample");
        assert_eq!(key.read(&store), None);
    }

    #[test]
    fn test_json_key_wrong_shape_reads_absent() {
        let store = MemoryStore::new();
        store.set("sample", "[1, 2, 3]").unwrap();

        let key = StorageKey::<Sample>::json("sample");
        assert_eq!(key.read(&store), None);
    }

    #[test]
    fn test_text_key_stores_verbatim() {
        let store = MemoryStore::new();
        let key = StorageKey::<String>::text("auth_token");

        key.write(&store, &"mock-jwt-token-1".to_string()).unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("mock-jwt-token-1"));
        assert_eq!(key.read(&store).as_deref(), Some("mock-jwt-token-1"));
    }

    #[test]
    fn test_text_key_empty_reads_absent() {
        let store = MemoryStore::new();
        store.set("auth_token", "").unwrap();

        assert_eq!(StorageKey::<String>::text("auth_token").read(&store), None);
    }

    #[test]
    fn test_clear_removes_entry() {
        let store = MemoryStore::new();
        let key = StorageKey::<String>::text("auth_token");
        key.write(&store, &"t".to_string()).unwrap();

        key.clear(&store).unwrap();
        assert_eq!(key.read(&store), None);
        assert!(store.is_empty());
    }
}
