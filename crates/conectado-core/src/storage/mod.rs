//! Persistent key-value storage for client-side session state.
//!
//! This module provides:
//! - `KeyValueStore`: the string-to-string storage seam
//! - `FileStore`: a single JSON file on disk, the default backing store
//! - `MemoryStore`: an in-process map for tests and ephemeral runs
//! - `StorageKey`: a typed key with explicit encode/decode
//!
//! Values that are missing or fail to decode are both read back as `None`.

pub mod key;
pub mod store;

pub use key::StorageKey;
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
