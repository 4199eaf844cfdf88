use mixtape_library::{ConfigError, ReadError, RegistryError, ScanError};
use serde::Serialize;

/// Coarse error category the UI switches on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Persistence,
    CorruptState,
    Io,
    Config,
    Paths,
}

/// Error returned across the command boundary, rendered by the UI as-is.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CommandError {
            kind,
            message: message.into(),
        }
    }
}

impl From<RegistryError> for CommandError {
    fn from(err: RegistryError) -> Self {
        let kind = if err.is_corrupt() {
            ErrorKind::CorruptState
        } else {
            ErrorKind::Persistence
        };
        CommandError::new(kind, err.to_string())
    }
}

impl From<ReadError> for CommandError {
    fn from(err: ReadError) -> Self {
        CommandError::new(ErrorKind::Io, err.to_string())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::new(ErrorKind::Config, err.to_string())
    }
}

impl From<mixtape_paths::Error> for CommandError {
    fn from(err: mixtape_paths::Error) -> Self {
        CommandError::new(ErrorKind::Paths, err.to_string())
    }
}

/// Stable, machine-readable reason for a failed root.
pub fn scan_reason(err: &ScanError) -> &'static str {
    match err {
        ScanError::NotFound => "not_found",
        ScanError::PermissionDenied => "permission_denied",
        ScanError::NotADirectory => "not_a_directory",
        ScanError::Io(_) => "io",
        ScanError::Cancelled => "cancelled",
        ScanError::TaskFailed(_) => "task_failed",
    }
}
