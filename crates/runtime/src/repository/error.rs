//! Error types raised by save repository implementations.

use thiserror::Error;

/// Errors surfaced by save repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("save repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("checksum mismatch in save slot '{slot}'")]
    ChecksumMismatch { slot: String },

    #[error("unsupported save version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid save slot name '{0}'")]
    InvalidSlot(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
