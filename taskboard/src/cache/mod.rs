//! Local key-value mirror of the task collection.
//!
//! Defines the [`PersistedCache`] trait — a synchronous string get/set
//! store — plus helpers that read and write the task snapshot under
//! [`TASKS_KEY`]. Implementations:
//! - [`file::FileCache`] — one file per key in a data directory
//! - [`memory::MemoryCache`] — map-backed, for tests

pub mod file;
pub mod memory;

use std::path::PathBuf;

use taskboard_proto::codec::{self, CodecError};
use taskboard_proto::task::Task;

/// Key under which the whole task collection is stored.
pub const TASKS_KEY: &str = "tasks";

/// Errors that can occur while reading or writing the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O operation on the backing file failed.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The key cannot be used as a storage name.
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),

    /// The stored snapshot is malformed.
    #[error("malformed cached snapshot: {0}")]
    Malformed(#[from] CodecError),
}

/// Synchronous key-value string storage.
///
/// Reads and writes are small and bounded, so callers perform them inline.
pub trait PersistedCache {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Reads the cached task snapshot.
///
/// # Errors
///
/// Returns [`CacheError::Malformed`] if the stored value is not a valid
/// snapshot, or the backend's error if it cannot be read.
pub fn load_snapshot<C: PersistedCache + ?Sized>(cache: &C) -> Result<Option<Vec<Task>>, CacheError> {
    let Some(raw) = cache.get(TASKS_KEY)? else {
        return Ok(None);
    };
    Ok(Some(codec::decode_snapshot(&raw)?))
}

/// Writes `tasks` as the cached snapshot.
///
/// # Errors
///
/// Returns [`CacheError`] if encoding or the backend write fails.
pub fn store_snapshot<C: PersistedCache + ?Sized>(cache: &C, tasks: &[Task]) -> Result<(), CacheError> {
    let json = codec::encode_snapshot(tasks)?;
    cache.set(TASKS_KEY, &json)
}
