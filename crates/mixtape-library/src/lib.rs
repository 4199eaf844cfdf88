//! Music folder registry and audio file discovery for Mixtape.

pub mod config;
pub mod data_url;
pub mod error;
pub mod extensions;
pub mod registry;
pub mod scanner;
pub mod store;
pub mod traits;

pub use config::{ScannerConfig, ScannerConfigBuilder};
pub use error::{ConfigError, ReadError, RegistryError, ScanError};
pub use extensions::{AudioExtension, ExtensionSet};
pub use registry::{FolderRegistry, FolderSet, MUSIC_FOLDERS_KEY, suggested_music_folder};
pub use scanner::{CancelFlag, DiscoveryReport, Discoverer, RootFailure};
pub use store::{JsonFileStore, MemoryStore};
pub use traits::KeyValueStore;
