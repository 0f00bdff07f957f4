//! Timeline configuration loader.

use std::path::Path;

use echoes_core::TimelineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for timeline tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a [`TimelineConfig`] from a TOML file.
    ///
    /// Keys missing from the file keep their default values.
    pub fn load(path: &Path) -> LoadResult<TimelineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid timeline config {}: {}", path.display(), e))
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> LoadResult<TimelineConfig> {
        let config: TimelineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("max_energy = 150.0\n").expect("config");
        assert_eq!(config.max_energy, 150.0);
        assert_eq!(
            config.transition_duration,
            TimelineConfig::DEFAULT_TRANSITION_DURATION
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ConfigLoader::parse("transition_duration = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("transition_duration"));

        let err = ConfigLoader::parse("max_energy = 10.0\nmin_transition_energy = 20.0\n")
            .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
