use std::{
    collections::HashMap,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use mixtape_paths::MixtapePaths;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{Level, debug, instrument};

use crate::{error::RegistryError, traits::KeyValueStore};

/// Key-value store kept as one JSON object in a file.
///
/// A missing or empty file reads as an empty store. Writes land in a sibling
/// temp file that is renamed over the target.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The app's settings store under its config dir.
    pub fn for_app(paths: &MixtapePaths) -> Self {
        Self::new(&paths.store_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence(&self, source: io::Error) -> RegistryError {
        RegistryError::Persistence {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<Map<String, Value>, RegistryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.persistence(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw).map_err(|source| RegistryError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, key: &str, map: &Map<String, Value>) -> Result<(), RegistryError> {
        let data = serde_json::to_string_pretty(map).map_err(|source| RegistryError::Serialize {
            key: key.to_owned(),
            source,
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.persistence(e))?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, data).map_err(|e| self.persistence(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.persistence(e)
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for JsonFileStore {
    #[instrument(level = Level::TRACE, skip(self), err)]
    fn get(&self, key: &str) -> Result<Option<Value>, RegistryError> {
        let mut map = self.load()?;
        Ok(map.remove(key))
    }

    #[instrument(level = Level::TRACE, skip(self, value), err)]
    fn set(&self, key: &str, value: Value) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock();
        let mut map = self.load()?;
        map.insert(key.to_owned(), value);
        self.write(key, &map)?;
        debug!(key, path = %self.path.display(), "settings stored");
        Ok(())
    }
}

/// In-process store, nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, RegistryError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), RegistryError> {
        self.values.lock().insert(key.to_owned(), value);
        Ok(())
    }
}
