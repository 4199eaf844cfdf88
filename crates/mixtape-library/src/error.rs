use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures of the folder registry and the key-value store behind it.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("could not persist settings at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings store {} is corrupted: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for `{key}` is corrupted: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize value for `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    /// Whether the stored data itself is unreadable, as opposed to the disk.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            RegistryError::CorruptStore { .. } | RegistryError::CorruptState { .. }
        )
    }
}

/// Why a single root folder contributed nothing to a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("folder does not exist")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("not a directory")]
    NotADirectory,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("scan was cancelled")]
    Cancelled,

    #[error("scan task failed: {0}")]
    TaskFailed(String),
}

impl From<io::Error> for ScanError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ScanError::NotFound,
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied,
            io::ErrorKind::NotADirectory => ScanError::NotADirectory,
            _ => ScanError::Io(err),
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        io::Error::from(err).into()
    }
}

/// Failure to load a file for playback.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
