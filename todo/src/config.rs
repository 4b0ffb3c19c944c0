//! Configuration for the todo binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The library itself reads no environment; only `main` calls [`Config::from_env`].

use crate::storage::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default file backing the key-value store
const DEFAULT_STORAGE_PATH: &str = "todos.json";

/// Default tracing filter
const DEFAULT_LOG_FILTER: &str = "todo=info,checklist_runtime=info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,
    /// Tracing filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the collection is stored under (`TODO_STORAGE_KEY`)
    pub key: String,
    /// File backing the key-value store (`TODO_STORAGE_PATH`)
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                key: DEFAULT_STORAGE_KEY.to_string(),
                path: PathBuf::from(DEFAULT_STORAGE_PATH),
            },
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or blank variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            storage: StorageConfig {
                key: var("TODO_STORAGE_KEY").unwrap_or(defaults.storage.key),
                path: var("TODO_STORAGE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.path),
            },
            log_filter: var("TODO_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
