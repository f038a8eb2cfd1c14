//! Client-side key/value storage.
//!
//! Two stores back the visitor's identity:
//! - a **durable** store that survives restarts (bearer token, cached customer)
//! - a **tab-scoped** store that lives as long as one tab (anonymous session id)
//!
//! Both are injected as [`KeyValueStore`] trait objects so tests can swap in
//! [`MemoryStore`] while the CLI uses [`FileStore`].

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A structured value could not be encoded for storage.
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage with `localStorage`-like semantics.
///
/// Reads never fail: a missing or unreadable value is reported as absent.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the deletion could not be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys used in the durable and tab-scoped stores.
pub mod keys {
    /// Durable: customer bearer token.
    pub const TOKEN: &str = "token";

    /// Durable: JSON-serialized customer record.
    pub const CUSTOMER: &str = "customer";

    /// Tab-scoped: anonymous cart session identifier.
    pub const SESSION_ID: &str = "session_id";
}
