use super::{CheckpointRecord, CheckpointStore, require_non_empty};
use crate::core::error::CheckpointError;
use crate::core::pool::KeyedLocks;
use std::sync::Arc;

/// Public entry point for saving progress.
///
/// Clones share the store and the per-agent lock registry, so hand a clone to
/// each worker thread rather than building a new writer.
pub struct CheckpointWriter<S> {
    store: Arc<S>,
    locks: Arc<KeyedLocks>,
}

impl<S> Clone for CheckpointWriter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: CheckpointStore> CheckpointWriter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Append a checkpoint for `agent_id`.
    ///
    /// Both arguments are trimmed and must be non-empty. Each call appends a new
    /// record, even when `message` repeats the previous one.
    pub fn save(&self, agent_id: &str, message: &str) -> Result<CheckpointRecord, CheckpointError> {
        let agent_id = require_non_empty("agent_id", agent_id)?;
        let message = require_non_empty("message", message)?;

        let record = self
            .locks
            .with_lock(agent_id, || self.store.append(agent_id, message))?;

        tracing::info!(agent_id, sequence = record.sequence, "checkpoint saved");
        Ok(record)
    }
}
