use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use tracing::debug;

use crate::{errors::Error, fs_utils};

/// Env var that moves every location under one base dir ("portable" mode).
pub const ENV_BASE_DIR: &str = "MIXTAPE_BASE_DIR";

/// Every directory and file the app keeps on disk.
#[derive(Debug, Clone)]
pub struct MixtapePaths {
    // config_dir
    pub config_dir: PathBuf,
    /// Key-value store holding user state such as the chosen music folders.
    pub store_file: PathBuf,
    /// Scanner settings (TOML), optional content.
    pub settings_file: PathBuf,

    // data_dir
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Plain-text log the app appends to on every run.
    pub log_file: PathBuf,

    pub lock_file: PathBuf,
}

impl MixtapePaths {
    /// Resolves the locations from `MIXTAPE_BASE_DIR` or the OS user dirs, then
    /// creates and validates them.
    pub fn new() -> Result<Self, Error> {
        match env::var_os(ENV_BASE_DIR) {
            Some(base) => Self::with_base(Path::new(&base)),
            None => {
                let proj = ProjectDirs::from("com", "Mixtape", "Mixtape").ok_or(Error::NoHome)?;
                Self::from_dirs(proj.config_dir().to_path_buf(), proj.data_dir().to_path_buf())
            }
        }
    }

    /// Lays every location out under `base`.
    pub fn with_base(base: &Path) -> Result<Self, Error> {
        Self::from_dirs(base.join("config"), base.join("data"))
    }

    fn from_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Result<Self, Error> {
        let paths = MixtapePaths {
            store_file: config_dir.join("settings.json"),
            settings_file: config_dir.join("settings.toml"),
            config_dir,

            log_file: data_dir.join("logs").join("mixtape.log"),
            logs_dir: data_dir.join("logs"),
            lock_file: data_dir.join("mixtape.lock"),
            data_dir,
        };

        debug!(config = %paths.config_dir.display(), data = %paths.data_dir.display(), "resolved paths");

        paths.ensure_structure()?;
        paths.validate_structure()?;

        Ok(paths)
    }

    /// Creates `mixtape.lock` if needed and takes an exclusive advisory lock on it.
    /// Keep the returned `File` alive to hold the lock. Fails with
    /// [`Error::AlreadyRunning`] instead of waiting when another instance holds it.
    pub fn try_lock(&self) -> Result<File, Error> {
        fs_utils::try_lock_file(&self.lock_file)
    }

    /// Opens the log file for appending.
    pub fn open_log(&self) -> Result<File, Error> {
        fs_utils::open_append(&self.log_file)
    }
}

impl MixtapePaths {
    pub fn ensure_structure(&self) -> Result<(), Error> {
        fs_utils::ensure_dir(&self.config_dir)?;
        fs_utils::ensure_dir(&self.data_dir)?;
        fs_utils::ensure_dir(&self.logs_dir)?;

        fs_utils::ensure_file(&self.store_file)?;
        fs_utils::ensure_file(&self.settings_file)?;

        Ok(())
    }

    /// Checks that every directory exists and is writable, recreating missing ones.
    pub fn validate_structure(&self) -> Result<(), Error> {
        for dir in [&self.config_dir, &self.data_dir, &self.logs_dir] {
            if !dir.exists() {
                fs_utils::ensure_dir(dir)?;
            }
            fs_utils::check_writable(dir)?;
        }
        Ok(())
    }
}
