//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

use echoes_runtime::SessionConfig;

/// Get the platform-specific log directory
///
/// Follows platform conventions:
/// - macOS: `~/Library/Caches/echoes/logs`
/// - Linux: `~/.cache/echoes/logs` (or `$XDG_CACHE_HOME/echoes/logs`)
/// - Windows: `%LOCALAPPDATA%\echoes\logs`
/// - Fallback: `/tmp/echoes/logs`
pub fn log_dir() -> PathBuf {
    let base_dir = directories::ProjectDirs::from("", "", "echoes")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/echoes"));

    base_dir.join("logs")
}

/// Directory holding save slots, honouring `ECHOES_SAVE_DIR`.
pub fn save_dir() -> PathBuf {
    SessionConfig::from_env().save_dir
}
