use std::path::{Path, PathBuf};

use mixtape_paths::UserDirs;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{Level, debug, instrument};

use crate::{error::RegistryError, traits::KeyValueStore};

/// Store key holding the chosen music folders.
pub const MUSIC_FOLDERS_KEY: &str = "musicFolders";

/// Ordered list of root folders the user picked. Duplicates are kept as given.
pub type FolderSet = Vec<PathBuf>;

/// The OS audio folder (`~/Music` and friends), a sensible first root to offer.
pub fn suggested_music_folder() -> Option<PathBuf> {
    UserDirs::new().and_then(|ud| ud.audio_dir().map(|p| p.to_path_buf()))
}

/// Persists the user's root folders in a [`KeyValueStore`].
///
/// The value under [`MUSIC_FOLDERS_KEY`] is a JSON array of path strings.
/// Older installs wrote that array encoded as a JSON string, which is still
/// accepted on read.
///
/// Updates through one registry are serialized, so concurrent `add`/`remove`
/// calls never lose each other's changes. Separate processes sharing a store
/// file are kept apart by the instance lock in `mixtape_paths`, not here.
#[derive(Debug)]
pub struct FolderRegistry<S> {
    store: S,
    update_lock: Mutex<()>,
}

impl<S: KeyValueStore> FolderRegistry<S> {
    pub fn new(store: S) -> Self {
        FolderRegistry {
            store,
            update_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored folders, or an empty set if nothing was ever stored.
    #[instrument(level = Level::DEBUG, skip(self), err)]
    pub fn get(&self) -> Result<FolderSet, RegistryError> {
        let Some(value) = self.store.get(MUSIC_FOLDERS_KEY)? else {
            debug!("no music folders stored yet");
            return Ok(FolderSet::new());
        };

        let corrupt = |source| RegistryError::CorruptState {
            key: MUSIC_FOLDERS_KEY.to_owned(),
            source,
        };

        match value {
            Value::String(encoded) => serde_json::from_str(&encoded).map_err(corrupt),
            value => serde_json::from_value(value).map_err(corrupt),
        }
    }

    /// Replaces the stored folders with `folders`.
    #[instrument(level = Level::DEBUG, skip(self), fields(count = folders.len()), err)]
    pub fn set(&self, folders: &[PathBuf]) -> Result<(), RegistryError> {
        let _update = self.update_lock.lock();
        self.write(folders)
    }

    /// Appends `folder` unless it is already stored. Returns the new set.
    pub fn add(&self, folder: PathBuf) -> Result<FolderSet, RegistryError> {
        let _update = self.update_lock.lock();
        let mut folders = self.get()?;
        if !folders.contains(&folder) {
            folders.push(folder);
            self.write(&folders)?;
        }
        Ok(folders)
    }

    /// Drops every occurrence of `folder`. Returns the new set.
    pub fn remove(&self, folder: &Path) -> Result<FolderSet, RegistryError> {
        let _update = self.update_lock.lock();
        let mut folders = self.get()?;
        let before = folders.len();
        folders.retain(|f| f != folder);
        if folders.len() != before {
            self.write(&folders)?;
        }
        Ok(folders)
    }

    // callers hold `update_lock`
    fn write(&self, folders: &[PathBuf]) -> Result<(), RegistryError> {
        let value = serde_json::to_value(folders).map_err(|source| RegistryError::Serialize {
            key: MUSIC_FOLDERS_KEY.to_owned(),
            source,
        })?;
        self.store.set(MUSIC_FOLDERS_KEY, value)
    }
}
