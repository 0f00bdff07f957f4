//! Content loaders for reading game data from files.
//!
//! Each loader parses one file format into `echoes-core` types through their
//! serde derives. [`ContentFactory`] ties them to a data directory layout.

pub mod classes;
pub mod config;
pub mod factory;

pub use classes::ClassLoader;
pub use config::ConfigLoader;
pub use factory::{ContentFactory, LoadedContent};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
