//! Per-key exclusive locks for serialized write access.
//!
//! Writers for the same key queue on one mutex; writers for different keys
//! never touch each other's mutex. The registry map itself is only held long
//! enough to look up, insert or prune an entry. An entry lives only while some
//! caller holds or waits on its lock, so the registry is bounded by the number
//! of keys in flight rather than every key ever seen.
//!
//! These locks are process-local. Cross-process exclusion comes from the
//! `BEGIN IMMEDIATE` transaction the store wraps around each append.

use crate::core::error::CheckpointError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Registry of named write locks.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>>, CheckpointError> {
        self.entries.lock().map_err(|_| {
            CheckpointError::StorageUnavailable("lock registry poisoned".to_string())
        })
    }

    fn entry(&self, key: &str) -> Result<Arc<Mutex<()>>, CheckpointError> {
        let mut entries = self.registry()?;
        Ok(Arc::clone(entries.entry(key.to_string()).or_default()))
    }

    /// Drop the registry entry for `key` if `entry` is its last outside handle.
    fn release(&self, key: &str, entry: &Arc<Mutex<()>>) {
        let Ok(mut entries) = self.registry() else {
            return;
        };
        // Clones are only handed out under the registry lock, so a count of two
        // (map + caller) cannot grow while we hold it.
        let idle = entries
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, entry) && Arc::strong_count(entry) == 2);
        if idle {
            entries.remove(key);
        }
    }

    /// Run `f` while holding the exclusive lock for `key`.
    pub fn with_lock<F, R>(&self, key: &str, f: F) -> Result<R, CheckpointError>
    where
        F: FnOnce() -> Result<R, CheckpointError>,
    {
        let entry = self.entry(key)?;
        let result = match entry.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(CheckpointError::StorageUnavailable(format!(
                "write lock for '{}' poisoned",
                key
            ))),
        };
        self.release(key, &entry);
        result
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
