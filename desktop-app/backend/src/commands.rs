//! The calls the UI process makes into the backend.
//!
//! Each command mirrors one channel of the desktop shell and returns either a
//! serializable value or a [`CommandError`].

use std::path::PathBuf;

use mixtape_library::{DiscoveryReport, FolderSet, KeyValueStore, data_url};
use serde::Serialize;
use tracing::{Level, info, instrument, warn};

use crate::{
    error::{CommandError, scan_reason},
    state::AppState,
};

/// A root folder the scan could not read.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanFailure {
    /// The root as the caller passed it, lossily decoded for display.
    pub root: String,
    pub reason: &'static str,
    pub message: String,
}

/// What the UI gets back from a search.
///
/// Paths travel as strings. A file whose path is not valid UTF-8 cannot be
/// handed back to `read_file_as_data_url` intact, so it is left out of
/// `files` and counted in `skipped_entries` instead.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub files: Vec<String>,
    pub failures: Vec<ScanFailure>,
    pub skipped_entries: usize,
}

impl From<DiscoveryReport> for SearchResponse {
    fn from(report: DiscoveryReport) -> Self {
        let mut skipped_entries = report.skipped_entries;
        let files = report
            .files
            .into_iter()
            .filter_map(|path| match path.into_os_string().into_string() {
                Ok(path) => Some(path),
                Err(raw) => {
                    warn!(path = ?raw, "skipping file with a non UTF-8 path");
                    skipped_entries += 1;
                    None
                }
            })
            .collect();

        SearchResponse {
            files,
            failures: report
                .failures
                .into_iter()
                .map(|f| ScanFailure {
                    root: f.root.to_string_lossy().into_owned(),
                    reason: scan_reason(&f.error),
                    message: f.error.to_string(),
                })
                .collect(),
            skipped_entries,
        }
    }
}

/// `get-selected-folder`
pub fn get_selected_folders<S: KeyValueStore>(state: &AppState<S>) -> Result<FolderSet, CommandError> {
    Ok(state.registry().get()?)
}

/// `update-selected-folder`
#[instrument(level = Level::INFO, skip(state), err)]
pub fn update_selected_folders<S: KeyValueStore>(
    state: &AppState<S>,
    folders: Vec<PathBuf>,
) -> Result<(), CommandError> {
    state.registry().set(&folders)?;
    Ok(())
}

pub fn add_selected_folder<S: KeyValueStore>(
    state: &AppState<S>,
    folder: PathBuf,
) -> Result<FolderSet, CommandError> {
    Ok(state.registry().add(folder)?)
}

pub fn remove_selected_folder<S: KeyValueStore>(
    state: &AppState<S>,
    folder: PathBuf,
) -> Result<FolderSet, CommandError> {
    Ok(state.registry().remove(&folder)?)
}

/// `deep-search-music-files`
pub async fn deep_search_music_files<S: KeyValueStore>(
    state: &AppState<S>,
    folders: Vec<PathBuf>,
) -> Result<SearchResponse, CommandError> {
    let scan = state.begin_scan();
    let report = state
        .discoverer()
        .discover_with_cancel(folders, scan.flag())
        .await;
    Ok(report.into())
}

/// Scans whatever folders are stored.
pub async fn scan_selected_folders<S: KeyValueStore>(
    state: &AppState<S>,
) -> Result<SearchResponse, CommandError> {
    let folders = get_selected_folders(state)?;
    if folders.is_empty() {
        info!("no folders selected, nothing to scan");
    }
    deep_search_music_files(state, folders).await
}

/// Aborts running searches; they finish with `cancelled` failures.
pub fn cancel_search<S: KeyValueStore>(state: &AppState<S>) -> usize {
    state.cancel_scans()
}

/// `read-file-as-data-url`
pub async fn read_file_as_data_url(path: PathBuf) -> Result<String, CommandError> {
    Ok(data_url::read_file_as_data_url(&path).await?)
}
