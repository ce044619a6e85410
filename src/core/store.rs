//! Store abstraction for Waymark's checkpoint state.
//!
//! A store is a directory holding the checkpoint database and its audit trail.
//! Two kinds exist: the project store under a discovered project root, and the
//! per-user store under `$HOME`. Both use the same `<base>/.waymark/data` layout.

use crate::core::error::CheckpointError;
use std::path::{Path, PathBuf};

/// Directory name that marks an initialized project.
pub const WAYMARK_DIR: &str = ".waymark";
/// Store data directory under [`WAYMARK_DIR`].
pub const DATA_DIR: &str = "data";
/// Config file under [`WAYMARK_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// User store at `~/.waymark/data/`
    User,
    /// Project store at `<root>/.waymark/data/`
    Repo,
}

/// Store handle. Everything the checkpoint subsystem persists lives under `root`.
#[derive(Debug, Clone)]
pub struct Store {
    pub kind: StoreKind,
    /// Absolute path to the store data directory
    pub root: PathBuf,
}

impl Store {
    /// Store of `kind` whose `.waymark` directory sits directly under `base`.
    pub fn under(kind: StoreKind, base: &Path) -> Self {
        Store {
            kind,
            root: base.join(WAYMARK_DIR).join(DATA_DIR),
        }
    }

    pub fn for_project(project_root: &Path) -> Self {
        Store::under(StoreKind::Repo, project_root)
    }

    /// The `.waymark` directory that owns this store.
    pub fn waymark_dir(&self) -> &Path {
        self.root.parent().unwrap_or(&self.root)
    }
}

/// Base directory of the user store.
pub fn user_home() -> Result<PathBuf, CheckpointError> {
    std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        CheckpointError::ConfigError("HOME is not set; cannot locate the user store".into())
    })
}
