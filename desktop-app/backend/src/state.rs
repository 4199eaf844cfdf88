use mixtape_library::{
    CancelFlag, Discoverer, FolderRegistry, JsonFileStore, KeyValueStore, ScannerConfig,
};
use mixtape_paths::MixtapePaths;
use parking_lot::Mutex;
use tracing::{Level, instrument};

use crate::error::CommandError;

/// Everything the commands need, built once at startup.
pub struct AppState<S = JsonFileStore> {
    registry: FolderRegistry<S>,
    discoverer: Discoverer,
    active_scans: Mutex<Vec<CancelFlag>>,
}

impl AppState<JsonFileStore> {
    /// Wires the settings store and scanner config found under `paths`.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub fn from_paths(paths: &MixtapePaths) -> Result<Self, CommandError> {
        let config = ScannerConfig::load(&paths.settings_file)?;
        Ok(AppState::new(JsonFileStore::for_app(paths), &config))
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: S, config: &ScannerConfig) -> Self {
        AppState {
            registry: FolderRegistry::new(store),
            discoverer: Discoverer::new(config),
            active_scans: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &FolderRegistry<S> {
        &self.registry
    }

    pub fn discoverer(&self) -> &Discoverer {
        &self.discoverer
    }

    /// Registers a running scan. The flag stays listed until the guard drops,
    /// which also happens when the awaiting future is dropped mid-scan.
    pub(crate) fn begin_scan(&self) -> ScanGuard<'_, S> {
        let flag = CancelFlag::new();
        self.active_scans.lock().push(flag.clone());
        ScanGuard { state: self, flag }
    }

    /// Trips every running scan. Returns how many were running.
    pub fn cancel_scans(&self) -> usize {
        let scans = self.active_scans.lock();
        for flag in scans.iter() {
            flag.cancel();
        }
        scans.len()
    }
}

impl<S> AppState<S> {
    fn end_scan(&self, flag: &CancelFlag) {
        self.active_scans.lock().retain(|f| f != flag);
    }
}

/// Keeps one scan listed in [`AppState`] while it runs.
pub(crate) struct ScanGuard<'a, S> {
    state: &'a AppState<S>,
    flag: CancelFlag,
}

impl<S> ScanGuard<'_, S> {
    pub(crate) fn flag(&self) -> &CancelFlag {
        &self.flag
    }
}

impl<S> Drop for ScanGuard<'_, S> {
    fn drop(&mut self) {
        // Walks already handed to the blocking pool outlive the future; stop them.
        self.flag.cancel();
        self.state.end_scan(&self.flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixtape_library::MemoryStore;

    #[test]
    fn dropping_the_guard_unlists_and_cancels_the_scan() {
        let state = AppState::new(MemoryStore::new(), &ScannerConfig::default());

        let guard = state.begin_scan();
        let flag = guard.flag().clone();
        assert!(!flag.is_cancelled());
        assert_eq!(state.active_scans.lock().len(), 1);

        drop(guard);
        assert!(flag.is_cancelled());
        assert_eq!(state.cancel_scans(), 0);
    }
}
