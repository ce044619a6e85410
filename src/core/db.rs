use crate::core::error::CheckpointError;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Open a connection with the pragmas every store connection needs.
///
/// WAL lets readers proceed while a writer holds the lock. `synchronous=FULL`
/// makes a committed append survive power loss, not just process exit.
pub fn db_connect(db_path: &Path, busy_timeout: Duration) -> Result<Connection, CheckpointError> {
    let conn = Connection::open(db_path).map_err(|e| {
        CheckpointError::StorageUnavailable(format!("cannot open {}: {}", db_path.display(), e))
    })?;
    conn.busy_timeout(busy_timeout)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    conn.execute_batch("PRAGMA synchronous=FULL;")?;
    Ok(conn)
}

/// Make sure the store directory exists and accepts writes before any
/// database file is touched.
pub fn storage_preflight(store_root: &Path) -> Result<(), CheckpointError> {
    let fail = |what: &str, e: std::io::Error| {
        CheckpointError::StorageUnavailable(format!(
            "STORAGE_PREFLIGHT_FAILED: {} {}: {}",
            what,
            store_root.display(),
            e
        ))
    };

    fs::create_dir_all(store_root).map_err(|e| fail("create", e))?;
    let probe = store_root.join(format!(".preflight-{}", ulid::Ulid::new()));
    fs::write(&probe, b"ok").map_err(|e| fail("write", e))?;
    fs::remove_file(&probe).map_err(|e| fail("cleanup", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn connect_enables_wal() {
        let tmp = TempDir::new().unwrap();
        let conn = db_connect(&tmp.path().join("t.db"), Duration::from_millis(100)).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn connect_to_directory_is_storage_unavailable() {
        let tmp = TempDir::new().unwrap();
        let err = db_connect(tmp.path(), Duration::from_millis(100)).unwrap_err();
        assert!(err.is_storage_unavailable(), "{err}");
    }

    #[test]
    fn preflight_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();

        let err = storage_preflight(&blocker).unwrap_err();
        assert!(err.to_string().contains("STORAGE_PREFLIGHT_FAILED"), "{err}");
    }

    #[test]
    fn preflight_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("a").join("b");
        storage_preflight(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }
}
