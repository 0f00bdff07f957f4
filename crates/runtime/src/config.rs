//! Session configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use directories::ProjectDirs;

/// Settings a host needs to run a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub session_id: String,
    /// Directory holding save slots.
    pub save_dir: PathBuf,
    /// Fixed frame rate used when the host drives the session at a steady step.
    pub frame_rate: u32,
}

impl SessionConfig {
    pub const DEFAULT_SESSION_ID: &'static str = "default";
    pub const DEFAULT_FRAME_RATE: u32 = 60;

    /// Construct configuration from process environment variables.
    ///
    /// - `ECHOES_SESSION_ID`
    /// - `ECHOES_SAVE_DIR`
    /// - `ECHOES_FRAME_RATE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(id) = env::var("ECHOES_SESSION_ID")
            && !id.trim().is_empty()
        {
            config.session_id = id.trim().to_string();
        }

        if let Some(dir) = read_env::<PathBuf>("ECHOES_SAVE_DIR") {
            config.save_dir = dir;
        }

        if let Some(rate) = read_env::<u32>("ECHOES_FRAME_RATE") {
            config.frame_rate = rate.max(1);
        }

        config
    }

    /// Seconds per frame at the configured frame rate.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: Self::DEFAULT_SESSION_ID.to_string(),
            save_dir: default_save_dir(),
            frame_rate: Self::DEFAULT_FRAME_RATE,
        }
    }
}

/// Platform data directory, e.g. `~/.local/share/echoes/saves` on Linux.
pub fn default_save_dir() -> PathBuf {
    ProjectDirs::from("", "", "echoes")
        .map(|dirs| dirs.data_dir().join("saves"))
        .unwrap_or_else(|| PathBuf::from(".echoes").join("saves"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse().ok())
}
