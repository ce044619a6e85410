use super::{AgentSummary, CheckpointRecord, CheckpointStore, require_non_empty};
use crate::core::error::CheckpointError;
use std::sync::Arc;

/// Where an agent stands. History only grows, so there is no terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointState {
    NoCheckpoint,
    HasCheckpoint(CheckpointRecord),
}

/// Read-side access for recovery and introspection. Takes no locks; every call
/// returns a fresh snapshot as of the call.
pub struct CheckpointReader<S> {
    store: Arc<S>,
}

impl<S> Clone for CheckpointReader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CheckpointStore> CheckpointReader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Most recent record, or `None` when the agent has never checkpointed.
    pub fn latest(&self, agent_id: &str) -> Result<Option<CheckpointRecord>, CheckpointError> {
        let agent_id = require_non_empty("agent_id", agent_id)?;
        self.store.read_latest(agent_id)
    }

    /// Every record for the agent, oldest first.
    pub fn history(&self, agent_id: &str) -> Result<Vec<CheckpointRecord>, CheckpointError> {
        let agent_id = require_non_empty("agent_id", agent_id)?;
        self.store.read_all(agent_id)
    }

    pub fn record(
        &self,
        agent_id: &str,
        sequence: u64,
    ) -> Result<Option<CheckpointRecord>, CheckpointError> {
        let agent_id = require_non_empty("agent_id", agent_id)?;
        self.store.read_one(agent_id, sequence)
    }

    pub fn state(&self, agent_id: &str) -> Result<CheckpointState, CheckpointError> {
        Ok(match self.latest(agent_id)? {
            Some(record) => CheckpointState::HasCheckpoint(record),
            None => CheckpointState::NoCheckpoint,
        })
    }

    pub fn agents(&self) -> Result<Vec<AgentSummary>, CheckpointError> {
        self.store.agents()
    }
}
