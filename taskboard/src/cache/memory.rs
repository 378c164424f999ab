//! Map-backed [`PersistedCache`] for tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{CacheError, PersistedCache};

/// In-memory key-value cache.
///
/// Writes can be made to fail with [`set_read_only`](MemoryCache::set_read_only)
/// to exercise the best-effort persistence path.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    read_only: Mutex<bool>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding a single `key` → `value` entry.
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let cache = Self::new();
        cache.entries.lock().insert(key.to_string(), value.into());
        cache
    }

    /// When `true`, every [`set`](PersistedCache::set) fails.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock() = read_only;
    }
}

impl PersistedCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if *self.read_only.lock() {
            return Err(CacheError::Io {
                path: key.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
