use crate::core::error::CheckpointError;
use crate::core::schemas;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL trail of accepted writes, one line per event.
///
/// The database is the source of truth. The trail exists so an operator can see
/// which agent wrote what and when without opening SQLite.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl AuditLog {
    pub fn new(store_root: &Path) -> Self {
        Self {
            path: store_root.join(schemas::AUDIT_LOG_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(
        &self,
        actor: &str,
        op: &str,
        db_path: &Path,
        status: &str,
    ) -> Result<(), CheckpointError> {
        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            status: status.to_string(),
        };
        let mut line = serde_json::to_string(&ev)
            .map_err(|e| CheckpointError::StorageUnavailable(e.to_string()))?;
        line.push('\n');

        // One write per event so concurrent appenders never split a line.
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Every event in the trail, oldest first. Unparseable lines are skipped.
    pub fn events(&self) -> Result<Vec<BrokerEvent>, CheckpointError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn events_append_in_order() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path());
        let db = tmp.path().join(schemas::CHECKPOINT_DB_NAME);

        log.record("implementer", "checkpoint.append", &db, "success")
            .unwrap();
        log.record("reviewer", "checkpoint.append", &db, "success")
            .unwrap();

        let events = log.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].actor, "implementer");
        assert_eq!(events[1].actor, "reviewer");
        assert_eq!(events[0].db_id, "checkpoints.db");
    }

    #[test]
    fn concurrent_records_stay_line_atomic() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join(schemas::CHECKPOINT_DB_NAME);

        let handles: Vec<_> = (0..16)
            .map(|t| {
                let log = AuditLog::new(tmp.path());
                let db = db.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let actor = format!("agent-{t}");
                        log.record(&actor, "checkpoint.append", &db, "success")
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let log = AuditLog::new(tmp.path());
        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 800);
        assert_eq!(log.events().unwrap().len(), 800);
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(AuditLog::new(tmp.path()).events().unwrap().is_empty());
    }
}
