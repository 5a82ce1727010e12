//! Client-side key/value storage.
//!
//! This is the storefront's equivalent of browser local storage: a flat map
//! of string keys to string values that survives between runs. All key names
//! live in [`keys`] so every consumer agrees on them.
//!
//! # Backends
//!
//! - [`FileStore`] - a JSON file in the state directory
//! - [`MemoryStore`] - in-process only, used by tests

mod file;
pub mod keys;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Encoding a value for storage failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Another thread panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A persistent string key/value store.
pub trait LocalStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}
