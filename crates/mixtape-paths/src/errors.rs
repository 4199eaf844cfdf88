use std::{io, path::PathBuf};

/// Errors raised while resolving or preparing the app's storage locations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No base directory could be determined (HOME, XDG, etc).
    #[error(
        "Could not determine the project directory, the call to ProjectDirs failed, \
         the system probably does not provide a valid $HOME path."
    )]
    NoHome,

    /// The instance lock is held by another process.
    #[error("another Mixtape instance is running (lock held on {})", lock_file.display())]
    AlreadyRunning { lock_file: PathBuf },

    /// I/O failure while creating dirs, files or locks.
    #[error(transparent)]
    Io(#[from] io::Error),
}
