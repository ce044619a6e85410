use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error(transparent)]
    ServiceAbsent(#[from] ServiceAbsent),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// The checkpoint service could not be located from a starting directory.
///
/// Only the discovery probe produces this. Callers at the boundary may treat
/// it as informational and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no checkpoint store found from {}", .root.display())]
pub struct ServiceAbsent {
    pub root: PathBuf,
}

impl From<rusqlite::Error> for CheckpointError {
    fn from(err: rusqlite::Error) -> Self {
        CheckpointError::StorageUnavailable(err.to_string())
    }
}

impl CheckpointError {
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, CheckpointError::StorageUnavailable(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CheckpointError::InvalidArgument(_))
    }
}
