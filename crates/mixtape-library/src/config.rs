use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{Level, instrument};

use crate::{
    error::ConfigError,
    extensions::{AudioExtension, ExtensionSet},
};

/// Prefix of the environment variables layered over `settings.toml`.
pub const ENV_PREFIX: &str = "MIXTAPE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct ScannerConfig {
    /// Extensions a scan reports. Case-insensitive on disk.
    pub extensions: Vec<AudioExtension>,
    /// Descend into symlinked directories. Loops are detected either way.
    pub follow_symlinks: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            extensions: vec![AudioExtension::Mp3],
            follow_symlinks: false,
        }
    }
}

impl ScannerConfig {
    /// Reads `path` (TOML, may be empty or missing) and then `MIXTAPE_*` env vars.
    #[instrument(level = Level::DEBUG, err)]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg: ScannerConfig = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extensions"),
            )
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one audio extension must be enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::new(self.extensions.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_mp3_without_symlinks() {
        let cfg = ScannerConfig::default();
        assert_eq!(cfg.extensions, vec![AudioExtension::Mp3]);
        assert!(!cfg.follow_symlinks);
    }

    #[test]
    fn builder_fills_unset_fields_with_defaults() {
        let cfg = ScannerConfigBuilder::default()
            .follow_symlinks(true)
            .build()
            .unwrap();
        assert_eq!(cfg.extensions, vec![AudioExtension::Mp3]);
        assert!(cfg.follow_symlinks);
    }

    #[test]
    fn empty_file_loads_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(ScannerConfig::load(&path).unwrap(), ScannerConfig::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = tempdir().unwrap();
        let cfg = ScannerConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, ScannerConfig::default());
    }

    #[test]
    fn file_overrides_extensions() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "extensions = [\"mp3\", \"flac\"]\nfollow_symlinks = true\n").unwrap();

        let cfg = ScannerConfig::load(&path).unwrap();
        assert_eq!(cfg.extensions, vec![AudioExtension::Mp3, AudioExtension::Flac]);
        assert!(cfg.follow_symlinks);
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "extensions = []\n").unwrap();

        assert!(matches!(
            ScannerConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
