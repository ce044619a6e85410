//! Database names and schema DDL for the checkpoint store.

pub const CHECKPOINT_DB_NAME: &str = "checkpoints.db";
pub const AUDIT_LOG_NAME: &str = "broker.events.jsonl";

pub const CHECKPOINT_DB_SCHEMA_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS checkpoints (
        id TEXT PRIMARY KEY,
        agent_id TEXT NOT NULL,
        sequence INTEGER NOT NULL,
        message TEXT NOT NULL,
        ts_ms INTEGER NOT NULL,
        UNIQUE(agent_id, sequence)
    )
";
pub const CHECKPOINT_DB_SCHEMA_INDEX_AGENT: &str =
    "CREATE INDEX IF NOT EXISTS idx_checkpoints_agent_seq ON checkpoints(agent_id, sequence)";
pub const CHECKPOINT_DB_SCHEMA_INDEX_TS: &str =
    "CREATE INDEX IF NOT EXISTS idx_checkpoints_ts ON checkpoints(ts_ms)";
