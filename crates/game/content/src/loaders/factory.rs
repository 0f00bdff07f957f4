//! Content factory for loading everything a session needs from a data directory.

use std::path::{Path, PathBuf};

use echoes_core::TimelineConfig;

use crate::catalog::ClassCatalog;
use crate::loaders::{ClassLoader, ConfigLoader, LoadResult};

/// Everything loaded from a data directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedContent {
    pub timeline: TimelineConfig,
    pub classes: ClassCatalog,
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── timeline.toml
/// └── classes.ron
/// ```
///
/// Either file may be absent, in which case the built-in defaults are used.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const TIMELINE_FILE: &'static str = "timeline.toml";
    pub const CLASSES_FILE: &'static str = "classes.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data files shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load timeline tunables from `timeline.toml`.
    pub fn load_config(&self) -> LoadResult<TimelineConfig> {
        let path = self.data_dir.join(Self::TIMELINE_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no timeline config, using defaults");
            return Ok(TimelineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load class templates from `classes.ron`.
    pub fn load_classes(&self) -> LoadResult<ClassCatalog> {
        let path = self.data_dir.join(Self::CLASSES_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no class catalog, using built-ins");
            return Ok(ClassCatalog::builtin());
        }
        ClassLoader::load(&path)
    }

    pub fn load(&self) -> LoadResult<LoadedContent> {
        let content = LoadedContent {
            timeline: self.load_config()?,
            classes: self.load_classes()?,
        };
        tracing::info!(data_dir = %self.data_dir.display(), "content loaded");
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
