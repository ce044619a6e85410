//! Checkpoint plugin: durable, ordered progress markers per agent.
//!
//! An agent calls `save` when it finishes a stage of work. A supervisor, or the
//! same agent after a restart, calls `latest` to find out where to resume.
//!
//! # For AI Agents
//!
//! - **Record progress**: `waymark save <agent> "<what is done>"` after each completed stage
//! - **Resume**: `waymark latest <agent>` before starting; "no checkpoint" means a fresh start
//! - **Never edit history**: records are append-only; a new save supersedes, it never rewrites
//!
//! Records for one agent are totally ordered by `sequence`, assigned by the store.
//! Concurrent saves for the same agent are serialized; saves for different agents
//! proceed independently.

pub mod cli;
pub mod reader;
pub mod store;
pub mod writer;

pub use reader::{CheckpointReader, CheckpointState};
pub use store::{CheckpointStore, SqliteCheckpointStore};
pub use writer::CheckpointWriter;

use crate::core::config::Config;
use crate::core::error::CheckpointError;
use crate::core::schemas;
use crate::core::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One immutable progress marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// ULID, unique across the store
    pub id: String,
    pub agent_id: String,
    /// Starts at 1 for each agent and increases by one per accepted save.
    pub sequence: u64,
    pub message: String,
    /// Unix epoch milliseconds assigned by the store. Never decreases.
    pub timestamp: u64,
}

/// Per-agent view used by status listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub count: u64,
    pub latest: CheckpointRecord,
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn require_non_empty<'a>(
    field: &str,
    value: &'a str,
) -> Result<&'a str, CheckpointError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        tracing::debug!(field, "rejected empty argument");
        return Err(CheckpointError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(trimmed)
}

/// Writer and reader sharing one SQLite-backed store.
#[derive(Clone)]
pub struct CheckpointService {
    store: Store,
    writer: CheckpointWriter<SqliteCheckpointStore>,
    reader: CheckpointReader<SqliteCheckpointStore>,
}

impl CheckpointService {
    pub fn open(store: &Store, config: &Config) -> Result<Self, CheckpointError> {
        let backing = Arc::new(SqliteCheckpointStore::open(store, &config.storage)?);
        Ok(Self::from_store(store, backing))
    }

    pub fn from_store(store: &Store, backing: Arc<SqliteCheckpointStore>) -> Self {
        Self {
            store: store.clone(),
            writer: CheckpointWriter::new(Arc::clone(&backing)),
            reader: CheckpointReader::new(backing),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn writer(&self) -> &CheckpointWriter<SqliteCheckpointStore> {
        &self.writer
    }

    pub fn reader(&self) -> &CheckpointReader<SqliteCheckpointStore> {
        &self.reader
    }

    pub fn save(&self, agent_id: &str, message: &str) -> Result<CheckpointRecord, CheckpointError> {
        self.writer.save(agent_id, message)
    }

    pub fn latest(&self, agent_id: &str) -> Result<Option<CheckpointRecord>, CheckpointError> {
        self.reader.latest(agent_id)
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "checkpoint",
        "version": "0.1.0",
        "description": "Append-only per-agent progress checkpoints",
        "commands": [
            {
                "name": "init",
                "description": "Create the checkpoint store",
                "parameters": ["dir?"]
            },
            {
                "name": "save",
                "description": "Append a checkpoint for an agent",
                "parameters": ["agent", "message"]
            },
            {
                "name": "latest",
                "description": "Show an agent's most recent checkpoint",
                "parameters": ["agent"]
            },
            {
                "name": "history",
                "description": "List an agent's checkpoints in order",
                "parameters": ["agent", "limit?"]
            },
            { "name": "agents", "description": "Summarize every agent with checkpoints" }
        ],
        "storage": [schemas::CHECKPOINT_DB_NAME, schemas::AUDIT_LOG_NAME],
        "errors": ["InvalidArgument", "StorageUnavailable", "ServiceAbsent"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_non_empty_trims() {
        assert_eq!(require_non_empty("agent_id", "  implementer \n").unwrap(), "implementer");
    }

    #[test]
    fn require_non_empty_rejects_whitespace() {
        for bad in ["", "   ", "\t\n"] {
            let err = require_non_empty("message", bad).unwrap_err();
            assert!(err.is_invalid_argument());
            assert!(err.to_string().contains("message"));
        }
    }

    #[test]
    fn schema_lists_inbound_operations() {
        let schema = schema();
        let names: Vec<&str> = schema["commands"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert!(names.contains(&"save"));
        assert!(names.contains(&"latest"));
    }
}
