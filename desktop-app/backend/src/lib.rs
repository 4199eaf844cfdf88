pub mod commands;
pub mod error;
pub mod state;

pub use error::{CommandError, ErrorKind};
pub use state::AppState;

use std::{fs::File, sync::Arc};

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self,
        format::{DefaultFields, Format},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
/// Logs go to stderr so command output on stdout stays parseable, and are
/// also appended to `log_file` when one is given.
pub fn init_tracing(default_level: &str, log_file: Option<File>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_file.map(file_layer))
        .init();
}

/// Plain-text fmt layer writing to an already opened file.
pub fn file_layer<S>(file: File) -> fmt::Layer<S, DefaultFields, Format, Arc<File>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use tempfile::tempdir;

    #[test]
    fn file_layer_appends_events_to_the_log() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("mixtape.log");
        fs::write(&path, "earlier run\n").unwrap();

        let file = OpenOptions::new().append(true).open(&path).unwrap();
        let subscriber = tracing_subscriber::registry().with(file_layer(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(root = "/music", "root scan failed");
        });

        let log = fs::read_to_string(&path).unwrap();
        assert!(log.starts_with("earlier run\n"));
        assert!(log.contains("WARN"));
        assert!(log.contains("root scan failed"));
        assert!(log.contains("root=\"/music\""));
        assert!(!log.contains('\u{1b}'));
    }
}
