use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use futures::future::join_all;
use sugar_path::SugarPath;
use tracing::{Level, debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::{config::ScannerConfig, error::ScanError, extensions::ExtensionSet};

/// Shared flag a caller trips to stop a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Two flags are equal when they are clones of the same flag.
impl PartialEq for CancelFlag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CancelFlag {}

/// A root folder that contributed nothing, and why.
#[derive(Debug)]
pub struct RootFailure {
    pub root: PathBuf,
    pub error: ScanError,
}

impl fmt::Display for RootFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.root.display(), self.error)
    }
}

/// Outcome of one discovery run over a set of roots.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Absolute paths of every matching file. Order across roots is unspecified.
    pub files: Vec<PathBuf>,
    pub failures: Vec<RootFailure>,
    /// Entries below a root that could not be read.
    pub skipped_entries: usize,
}

impl DiscoveryReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped_entries == 0
    }
}

#[derive(Debug, Default)]
struct RootScan {
    files: Vec<PathBuf>,
    skipped: usize,
}

/// Finds audio files below a set of root folders.
///
/// Every root is walked on its own blocking task with its own result list;
/// the lists are concatenated once every walk has finished.
#[derive(Debug, Clone)]
pub struct Discoverer {
    extensions: Arc<ExtensionSet>,
    follow_symlinks: bool,
}

impl Default for Discoverer {
    fn default() -> Self {
        Discoverer::new(&ScannerConfig::default())
    }
}

impl Discoverer {
    pub fn new(config: &ScannerConfig) -> Self {
        Discoverer {
            extensions: Arc::new(config.extension_set()),
            follow_symlinks: config.follow_symlinks,
        }
    }

    pub async fn discover<I, P>(&self, roots: I) -> DiscoveryReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.discover_with_cancel(roots, &CancelFlag::new()).await
    }

    #[instrument(level = Level::INFO, skip_all)]
    pub async fn discover_with_cancel<I, P>(&self, roots: I, cancel: &CancelFlag) -> DiscoveryReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let started = Instant::now();

        let (roots, tasks): (Vec<PathBuf>, Vec<_>) = roots
            .into_iter()
            .map(|root| {
                let root: PathBuf = root.into();
                let extensions = self.extensions.clone();
                let follow_symlinks = self.follow_symlinks;
                let cancel = cancel.clone();
                let task = {
                    let root = root.clone();
                    tokio::task::spawn_blocking(move || {
                        walk_root(&root, &extensions, follow_symlinks, &cancel)
                    })
                };
                (root, task)
            })
            .unzip();

        info!(roots = roots.len(), "scan started");

        let mut report = DiscoveryReport::default();
        for (root, joined) in roots.into_iter().zip(join_all(tasks).await) {
            let outcome = joined.unwrap_or_else(|e| Err(ScanError::TaskFailed(e.to_string())));
            match outcome {
                Ok(scan) => {
                    debug!(root = %root.display(), files = scan.files.len(), "root scanned");
                    report.files.extend(scan.files);
                    report.skipped_entries += scan.skipped;
                }
                Err(error) => {
                    warn!(root = %root.display(), %error, "root scan failed");
                    report.failures.push(RootFailure { root, error });
                }
            }
        }

        info!(
            files = report.files.len(),
            failed_roots = report.failures.len(),
            skipped = report.skipped_entries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );

        report
    }
}

/// Absolute, canonical form of `p`.
pub fn normalize_path(p: &Path) -> std::io::Result<PathBuf> {
    let abs = p.absolutize();
    dunce::canonicalize(&abs)
}

fn walk_root(
    root: &Path,
    extensions: &ExtensionSet,
    follow_symlinks: bool,
    cancel: &CancelFlag,
) -> Result<RootScan, ScanError> {
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    let root = normalize_path(root)?;
    if !std::fs::metadata(&root)?.is_dir() {
        return Err(ScanError::NotADirectory);
    }

    let mut scan = RootScan::default();
    for next in WalkDir::new(&root).follow_links(follow_symlinks) {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let entry = match next {
            Ok(entry) => entry,
            // the root itself could not be listed
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                scan.skipped += 1;
                continue;
            }
        };

        if entry.file_type().is_file() && extensions.matches(entry.path()) {
            scan.files.push(entry.into_path());
        }
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ScannerConfigBuilder, extensions::AudioExtension};
    use std::{collections::HashSet, fs};
    use tempfile::{TempDir, tempdir};

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"ID3").unwrap();
    }

    fn as_set(files: &[PathBuf]) -> HashSet<PathBuf> {
        files.iter().cloned().collect()
    }

    fn music_tree() -> TempDir {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.mp3"));
        touch(&tmp.path().join("b.txt"));
        touch(&tmp.path().join("C.MP3"));
        touch(&tmp.path().join("sub").join("d.mp3"));
        tmp
    }

    #[tokio::test]
    async fn no_roots_no_files() {
        let report = Discoverer::default().discover(Vec::<PathBuf>::new()).await;
        assert!(report.files.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn finds_audio_files_case_insensitively() {
        let tmp = music_tree();
        let root = normalize_path(tmp.path()).unwrap();

        let report = Discoverer::default().discover([tmp.path()]).await;

        let expected: HashSet<PathBuf> = [
            root.join("a.mp3"),
            root.join("C.MP3"),
            root.join("sub").join("d.mp3"),
        ]
        .into_iter()
        .collect();
        assert_eq!(report.files.len(), 3);
        assert_eq!(as_set(&report.files), expected);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn directories_named_like_audio_are_skipped() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("album.mp3")).unwrap();
        touch(&tmp.path().join("album.mp3").join("track.mp3"));

        let report = Discoverer::default().discover([tmp.path()]).await;
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].ends_with("album.mp3/track.mp3"));
    }

    #[tokio::test]
    async fn missing_root_is_reported_without_hurting_siblings() {
        let good = music_tree();
        let missing = good.path().join("does-not-exist");

        let report = Discoverer::default()
            .discover([missing.clone(), good.path().to_path_buf()])
            .await;

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].root, missing);
        assert!(matches!(report.failures[0].error, ScanError::NotFound));
    }

    #[tokio::test]
    async fn file_root_is_not_a_directory() {
        let tmp = music_tree();
        let report = Discoverer::default().discover([tmp.path().join("a.mp3")]).await;

        assert!(report.files.is_empty());
        assert!(matches!(report.failures[0].error, ScanError::NotADirectory));
    }

    #[tokio::test]
    async fn disjoint_roots_return_the_union() {
        let a = music_tree();
        let b = tempdir().unwrap();
        touch(&b.path().join("x").join("y").join("z.mp3"));

        let report = Discoverer::default().discover([a.path(), b.path()]).await;

        let only_a = Discoverer::default().discover([a.path()]).await;
        let only_b = Discoverer::default().discover([b.path()]).await;
        let mut union = as_set(&only_a.files);
        union.extend(only_b.files);

        assert_eq!(report.files.len(), 4);
        assert_eq!(as_set(&report.files), union);
    }

    #[tokio::test]
    async fn nested_roots_may_repeat_files() {
        let tmp = music_tree();
        let report = Discoverer::default()
            .discover([tmp.path().to_path_buf(), tmp.path().join("sub")])
            .await;

        assert_eq!(report.files.len(), 4);
        assert_eq!(as_set(&report.files).len(), 3);
    }

    #[tokio::test]
    async fn repeated_scans_find_the_same_files() {
        let tmp = music_tree();
        let discoverer = Discoverer::default();

        let first = discoverer.discover([tmp.path()]).await;
        let second = discoverer.discover([tmp.path()]).await;
        assert_eq!(as_set(&first.files), as_set(&second.files));
    }

    #[tokio::test]
    async fn configured_extensions_are_honored() {
        let tmp = music_tree();
        touch(&tmp.path().join("e.FLAC"));

        let config = ScannerConfigBuilder::default()
            .extensions(vec![AudioExtension::Flac])
            .build()
            .unwrap();
        let report = Discoverer::new(&config).discover([tmp.path()]).await;

        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].ends_with("e.FLAC"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_roots_lose_no_entries() {
        const ROOTS: usize = 32;
        const FILES: usize = 50;

        let tmp = tempdir().unwrap();
        let mut roots = Vec::new();
        for r in 0..ROOTS {
            let root = tmp.path().join(format!("root-{r}"));
            for f in 0..FILES {
                touch(&root.join(format!("disc-{}", f % 3)).join(format!("{f}.mp3")));
            }
            touch(&root.join("cover.jpg"));
            roots.push(root);
        }

        let report = Discoverer::default().discover(roots).await;
        assert!(report.failures.is_empty());
        assert_eq!(report.files.len(), ROOTS * FILES);
        assert_eq!(as_set(&report.files).len(), ROOTS * FILES);
    }

    #[tokio::test]
    async fn cancelled_scan_reports_every_root() {
        let a = music_tree();
        let b = music_tree();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let report = Discoverer::default()
            .discover_with_cancel([a.path(), b.path()], &cancel)
            .await;

        assert!(report.files.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(
            report
                .failures
                .iter()
                .all(|f| matches!(f.error, ScanError::Cancelled))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancelling_a_running_scan_stops_the_walk() {
        const DIRS: usize = 20;
        const FILES: usize = 1000;

        let tmp = tempdir().unwrap();
        for d in 0..DIRS {
            for f in 0..FILES {
                touch(&tmp.path().join(format!("album-{d}")).join(format!("{f}.mp3")));
            }
        }

        let discoverer = Discoverer::default();
        let cancel = CancelFlag::new();
        let scan = tokio::spawn({
            let cancel = cancel.clone();
            let root = tmp.path().to_path_buf();
            async move { discoverer.discover_with_cancel([root], &cancel).await }
        });
        tokio::task::yield_now().await;
        cancel.cancel();

        let report = scan.await.unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].root, tmp.path());
        assert!(matches!(report.failures[0].error, ScanError::Cancelled));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directories_are_not_followed_by_default() {
        let tmp = music_tree();
        let outside = tempdir().unwrap();
        touch(&outside.path().join("elsewhere.mp3"));

        std::os::unix::fs::symlink(outside.path(), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("sub").join("loop")).unwrap();

        let report = Discoverer::default().discover([tmp.path()]).await;
        assert_eq!(report.files.len(), 3);
        assert!(report.is_complete());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn following_symlinks_still_terminates_on_loops() {
        let tmp = music_tree();
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("sub").join("loop")).unwrap();

        let config = ScannerConfigBuilder::default()
            .follow_symlinks(true)
            .build()
            .unwrap();
        let report = Discoverer::new(&config).discover([tmp.path()]).await;

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.skipped_entries, 1);
        assert!(report.failures.is_empty());
    }
}
