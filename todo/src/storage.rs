//! Persistence for the todo collection.
//!
//! Two layers:
//!
//! - [`KeyValueStore`]: the raw local store, get/set of string blobs by key.
//!   Fallible; backends report failures as [`StorageError`].
//! - [`TodoStorage`]: the adapter the reducer talks to. It reads and writes
//!   the whole collection as one JSON blob under one fixed key and never
//!   fails: a missing key, an unavailable store or a corrupt blob all read
//!   as the empty collection, and failed writes are logged and dropped.

use crate::collection::{Collection, CollectionError};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Key the collection is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Errors raised by a [`KeyValueStore`] backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// No persistent storage exists in this execution context
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A blob could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blob decoded but broke a collection invariant
    #[error("corrupt collection: {0}")]
    Corrupt(#[from] CollectionError),
}

/// A local key-value blob store
pub trait KeyValueStore: Send + Sync {
    /// Reads the blob at `key`; `Ok(None)` if the key is absent
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` at `key`, replacing any previous blob
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The store adapter capability injected into the reducer's environment
pub trait TodoStorage: Send + Sync {
    /// Reads the persisted collection, or an empty one on any failure
    fn load(&self) -> Collection;

    /// Persists the whole collection, swallowing any failure
    fn save(&self, todos: &Collection);
}

/// [`TodoStorage`] over any [`KeyValueStore`], one JSON blob under one key
#[derive(Debug, Clone)]
pub struct BlobStorage<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> BlobStorage<K> {
    /// Stores the collection in `store` under `key`
    #[must_use]
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Stores the collection in `store` under [`DEFAULT_STORAGE_KEY`]
    #[must_use]
    pub fn with_default_key(store: K) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    /// The underlying key-value store
    #[must_use]
    pub const fn store(&self) -> &K {
        &self.store
    }

    fn try_load(&self) -> Result<Option<Collection>, StorageError> {
        let Some(blob) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let mut todos: Collection = serde_json::from_str(&blob)?;
        todos.normalize()?;
        Ok(Some(todos))
    }

    fn try_save(&self, todos: &Collection) -> Result<(), StorageError> {
        let blob = serde_json::to_string(todos)?;
        self.store.set(&self.key, &blob)
    }
}

impl<K: KeyValueStore> TodoStorage for BlobStorage<K> {
    fn load(&self) -> Collection {
        match self.try_load() {
            Ok(Some(todos)) => {
                tracing::debug!(key = %self.key, count = todos.len(), "Loaded todos");
                todos
            },
            Ok(None) => {
                tracing::debug!(key = %self.key, "No stored todos, starting empty");
                Collection::new()
            },
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "Could not load todos, starting empty");
                Collection::new()
            },
        }
    }

    fn save(&self, todos: &Collection) {
        match self.try_save(todos) {
            Ok(()) => tracing::trace!(key = %self.key, count = todos.len(), "Saved todos"),
            Err(error) => tracing::warn!(key = %self.key, %error, "Could not save todos"),
        }
    }
}

/// In-process key-value store
///
/// Clones share the same data, so a test can keep a handle and inspect what
/// the adapter wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one entry
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut data) = store.data.write() {
            data.insert(key.into(), value.into());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self
            .data
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store backed by a single JSON object file
///
/// The file maps keys to blobs. Every `set` rewrites the whole file through a
/// sibling temp file and a rename, so readers see either the old or the new
/// contents.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Uses the file at `path`; it is created on the first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(error)) => {
                tracing::warn!(path = %self.path.display(), %error, "Replacing unreadable store file");
                HashMap::new()
            },
            Err(error) => return Err(error),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

/// A store for contexts without persistent storage; every call fails
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("no persistent storage".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no persistent storage".to_string()))
    }
}
