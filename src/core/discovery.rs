//! Project root discovery and the checkpoint-service capability probe.
//!
//! Both are pure functions of the filesystem they are pointed at, so tests can
//! hand them a synthetic tree.

use crate::core::error::ServiceAbsent;
use crate::core::store::{Store, StoreKind, WAYMARK_DIR};
use std::path::{Path, PathBuf};

/// Directory names that mark a project root.
pub const DEFAULT_MARKERS: &[&str] = &[WAYMARK_DIR, ".git", ".claude"];

/// Walk `start` and its ancestors and return the first directory that
/// contains any of `markers`. Falls back to `start` when none match.
pub fn find_root(start: &Path, markers: &[&str]) -> PathBuf {
    for dir in start.ancestors() {
        if let Some(marker) = markers.iter().find(|m| dir.join(m).exists()) {
            tracing::debug!(root = %dir.display(), marker = %marker, "project root found");
            return dir.to_path_buf();
        }
    }
    tracing::debug!(start = %start.display(), "no root marker found, using start directory");
    start.to_path_buf()
}

/// A located, initialized checkpoint service. Nothing has been opened yet.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    pub base: PathBuf,
    pub store: Store,
}

/// Ask whether the checkpoint service is available under `root`.
///
/// The service is present once `waymark init` has created `<root>/.waymark`.
pub fn probe_service(root: &Path, kind: StoreKind) -> Result<ServiceHandle, ServiceAbsent> {
    if root.join(WAYMARK_DIR).is_dir() {
        Ok(ServiceHandle {
            base: root.to_path_buf(),
            store: Store::under(kind, root),
        })
    } else {
        tracing::debug!(root = %root.display(), "checkpoint service absent");
        Err(ServiceAbsent {
            root: root.to_path_buf(),
        })
    }
}
