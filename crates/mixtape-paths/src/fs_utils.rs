use fs2::FileExt;
use std::{fs, fs::OpenOptions, io, path::Path};

use tracing::{Level, instrument};

use crate::errors::Error;

/// Creates `path` and any missing parents.
#[instrument(level = Level::TRACE, err)]
pub fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Creates an empty file at `path` if there is none yet, parents included.
#[instrument(level = Level::TRACE, err)]
pub fn ensure_file(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    if !path.exists() {
        fs::File::create(path)?;
    }

    Ok(())
}

/// Takes an exclusive advisory lock on `path` without waiting for it.
/// The lock lives as long as the returned handle.
#[instrument(level = Level::TRACE, err)]
pub fn try_lock_file(path: &Path) -> Result<fs::File, Error> {
    ensure_file(path)?;
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            Err(Error::AlreadyRunning {
                lock_file: path.to_path_buf(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Opens `path` for appending, creating it if needed.
#[instrument(level = Level::TRACE, err)]
pub fn open_append(path: &Path) -> Result<fs::File, Error> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[instrument(level = Level::TRACE, err)]
pub fn check_writable(path: &Path) -> Result<(), Error> {
    let meta = fs::metadata(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = meta.permissions().mode();
        if mode & 0o200 == 0 {
            return Err(denied(path));
        }
    }
    #[cfg(windows)]
    {
        if meta.permissions().readonly() {
            return Err(denied(path));
        }
    }
    #[cfg(not(any(unix, windows)))]
    let _ = meta;
    Ok(())
}

fn denied(path: &Path) -> Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("No write permission for {}", path.display()),
    )
    .into()
}
