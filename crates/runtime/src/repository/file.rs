//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::snapshot::{SaveEnvelope, SessionSnapshot};
use super::{RepositoryError, Result, SaveRepository};

/// File-based implementation of SaveRepository.
///
/// # File Format
///
/// Each slot is stored as `save_{slot}.bin`: a bincode [`SaveEnvelope`]
/// holding the format version, a SHA-256 digest and the bincode snapshot.
/// Writes go to a temp file first and are moved into place with a rename.
pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    /// Create a new file-based save repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a save file.
    pub fn save_path(&self, slot: &str) -> Result<PathBuf> {
        validate_slot(slot)?;
        Ok(self.base_dir.join(format!("save_{}.bin", slot)))
    }

    /// Read the raw envelope of a slot without decoding the snapshot.
    pub fn read_envelope(&self, slot: &str) -> Result<Option<SaveEnvelope>> {
        let path = self.save_path(slot)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        SaveEnvelope::from_bytes(&bytes).map(Some)
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<()> {
        let path = self.save_path(slot)?;
        let temp_path = path.with_extension("bin.tmp");

        let bytes = SaveEnvelope::seal(snapshot)?.to_bytes()?;

        // Write to temp file
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved slot '{}' to {}", slot, path.display());

        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SessionSnapshot>> {
        let Some(envelope) = self.read_envelope(slot)? else {
            return Ok(None);
        };
        let snapshot = envelope.open(slot)?;

        tracing::debug!("Loaded slot '{}' (version {})", slot, envelope.version);

        Ok(Some(snapshot))
    }

    fn exists(&self, slot: &str) -> bool {
        self.save_path(slot).is_ok_and(|path| path.exists())
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let path = self.save_path(slot)?;

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted slot '{}'", slot);
        }

        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(slot) = filename
                    .strip_prefix("save_")
                    .and_then(|s| s.strip_suffix(".bin"))
            {
                slots.push(slot.to_string());
            }
        }

        slots.sort_unstable();
        Ok(slots)
    }
}

/// Slot names become file names, so they are limited to `[A-Za-z0-9_-]`.
fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidSlot(slot.to_string()))
    }
}
