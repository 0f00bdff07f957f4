//! In-memory SaveRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::snapshot::{SaveEnvelope, SessionSnapshot};
use super::{RepositoryError, Result, SaveRepository};

/// In-memory implementation of SaveRepository.
///
/// Keeps sealed envelopes so loads go through the same checksum and version
/// checks as the file repository.
#[derive(Default)]
pub struct MemorySaveRepository {
    slots: RwLock<BTreeMap<String, SaveEnvelope>>,
}

impl MemorySaveRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveRepository for MemorySaveRepository {
    fn save(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<()> {
        let envelope = SaveEnvelope::seal(snapshot)?;
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.insert(slot.to_string(), envelope);
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SessionSnapshot>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots
            .get(slot)
            .map(|envelope| envelope.open(slot))
            .transpose()
    }

    fn exists(&self, slot: &str) -> bool {
        self.slots
            .read()
            .map(|slots| slots.contains_key(slot))
            .unwrap_or(false)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.remove(slot);
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.keys().cloned().collect())
    }
}
