use super::{AgentSummary, CheckpointRecord};
use crate::core::broker::AuditLog;
use crate::core::config::StorageConfig;
use crate::core::error::CheckpointError;
use crate::core::store::Store;
use crate::core::{db, schemas, time};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Append-only persistence of checkpoint records keyed by agent.
///
/// `append` must assign `sequence` and `timestamp` atomically with the insert;
/// callers serialize per agent but implementations may not rely on that alone.
pub trait CheckpointStore: Send + Sync {
    fn append(&self, agent_id: &str, message: &str) -> Result<CheckpointRecord, CheckpointError>;

    /// All records for `agent_id`, ascending by sequence. Empty for unknown agents.
    fn read_all(&self, agent_id: &str) -> Result<Vec<CheckpointRecord>, CheckpointError>;

    fn read_latest(&self, agent_id: &str) -> Result<Option<CheckpointRecord>, CheckpointError> {
        Ok(self.read_all(agent_id)?.pop())
    }

    fn read_one(
        &self,
        agent_id: &str,
        sequence: u64,
    ) -> Result<Option<CheckpointRecord>, CheckpointError> {
        Ok(self
            .read_all(agent_id)?
            .into_iter()
            .find(|r| r.sequence == sequence))
    }

    /// One summary per agent that has at least one record, ordered by agent id.
    fn agents(&self) -> Result<Vec<AgentSummary>, CheckpointError>;
}

/// [`CheckpointStore`] on a WAL-mode SQLite file inside a [`Store`].
///
/// Every operation opens its own connection, so one instance can be shared across
/// threads and several instances (or processes) can point at the same file.
#[derive(Debug)]
pub struct SqliteCheckpointStore {
    db_path: PathBuf,
    busy_timeout: Duration,
    audit: AuditLog,
    clock: fn() -> u64,
}

const SELECT_COLUMNS: &str = "SELECT id, agent_id, sequence, message, ts_ms FROM checkpoints";

fn row_to_record(row: &rusqlite::Row) -> Result<CheckpointRecord, rusqlite::Error> {
    Ok(CheckpointRecord {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        sequence: row.get::<_, i64>(2)? as u64,
        message: row.get(3)?,
        timestamp: row.get::<_, i64>(4)? as u64,
    })
}

pub fn checkpoint_db_path(root: &Path) -> PathBuf {
    root.join(schemas::CHECKPOINT_DB_NAME)
}

impl SqliteCheckpointStore {
    /// Open (creating if needed) the checkpoint database for `store`.
    pub fn open(store: &Store, config: &StorageConfig) -> Result<Self, CheckpointError> {
        db::storage_preflight(&store.root)?;
        let this = Self {
            db_path: checkpoint_db_path(&store.root),
            busy_timeout: config.busy_timeout(),
            audit: AuditLog::new(&store.root),
            clock: time::now_epoch_ms,
        };
        this.initialize()?;
        Ok(this)
    }

    /// Replace the wall clock used for timestamps.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    fn connect(&self) -> Result<Connection, CheckpointError> {
        db::db_connect(&self.db_path, self.busy_timeout)
    }

    fn initialize(&self) -> Result<(), CheckpointError> {
        let conn = self.connect()?;
        conn.execute(schemas::CHECKPOINT_DB_SCHEMA_TABLE, [])?;
        conn.execute(schemas::CHECKPOINT_DB_SCHEMA_INDEX_AGENT, [])?;
        conn.execute(schemas::CHECKPOINT_DB_SCHEMA_INDEX_TS, [])?;
        Ok(())
    }

    fn insert(&self, agent_id: &str, message: &str) -> Result<CheckpointRecord, CheckpointError> {
        let mut conn = self.connect()?;
        // IMMEDIATE takes the database write lock up front, so the MAX() reads below
        // cannot be invalidated by another connection before the insert.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last_sequence: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sequence), 0) FROM checkpoints WHERE agent_id = ?1",
            params![agent_id],
            |row| row.get(0),
        )?;
        let last_ts: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ts_ms), 0) FROM checkpoints",
            [],
            |row| row.get(0),
        )?;

        let record = CheckpointRecord {
            id: time::new_event_id(),
            agent_id: agent_id.to_string(),
            sequence: last_sequence as u64 + 1,
            message: message.to_string(),
            timestamp: (self.clock)().max(last_ts as u64),
        };

        tx.execute(
            "INSERT INTO checkpoints(id, agent_id, sequence, message, ts_ms)
             VALUES(?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.agent_id,
                record.sequence as i64,
                record.message,
                record.timestamp as i64
            ],
        )?;
        tx.commit()?;
        Ok(record)
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn append(&self, agent_id: &str, message: &str) -> Result<CheckpointRecord, CheckpointError> {
        let record = self.insert(agent_id, message).inspect_err(|e| {
            tracing::warn!(
                agent_id,
                db = %self.db_path.display(),
                error = %e,
                "checkpoint append failed"
            );
        })?;

        // The record is committed at this point. Failing the call now would invite
        // a retry and a duplicate record, so a broken audit trail is only reported.
        if let Err(e) = self
            .audit
            .record(agent_id, "checkpoint.append", &self.db_path, "success")
        {
            tracing::warn!(
                path = %self.audit.path().display(),
                error = %e,
                "audit trail write failed"
            );
        }

        tracing::debug!(
            agent_id,
            sequence = record.sequence,
            timestamp = record.timestamp,
            "checkpoint appended"
        );
        Ok(record)
    }

    fn read_all(&self, agent_id: &str) -> Result<Vec<CheckpointRecord>, CheckpointError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE agent_id = ?1 ORDER BY sequence ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![agent_id], row_to_record)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn read_latest(&self, agent_id: &str) -> Result<Option<CheckpointRecord>, CheckpointError> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                &format!(
                    "{} WHERE agent_id = ?1 ORDER BY sequence DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![agent_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn read_one(
        &self,
        agent_id: &str,
        sequence: u64,
    ) -> Result<Option<CheckpointRecord>, CheckpointError> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                &format!("{} WHERE agent_id = ?1 AND sequence = ?2", SELECT_COLUMNS),
                params![agent_id, sequence as i64],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn agents(&self) -> Result<Vec<AgentSummary>, CheckpointError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.agent_id, c.sequence, c.message, c.ts_ms, g.n
             FROM checkpoints c
             JOIN (SELECT agent_id, MAX(sequence) AS max_seq, COUNT(*) AS n
                   FROM checkpoints GROUP BY agent_id) g
               ON c.agent_id = g.agent_id AND c.sequence = g.max_seq
             ORDER BY c.agent_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AgentSummary {
                agent_id: row.get(1)?,
                count: row.get::<_, i64>(5)? as u64,
                latest: row_to_record(row)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
