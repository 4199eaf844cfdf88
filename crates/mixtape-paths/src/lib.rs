//! Crate `mixtape_paths`: storage locations and the single-instance lock.

mod errors;
mod fs_utils;
mod paths;

pub use errors::Error;
pub use fs_utils::{ensure_dir, ensure_file};
pub use paths::{ENV_BASE_DIR, MixtapePaths};

pub use directories::UserDirs;
