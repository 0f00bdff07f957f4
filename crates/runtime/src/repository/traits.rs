//! Repository contract for saving and loading sessions.

use super::Result;
use super::snapshot::SessionSnapshot;

/// Repository for session persistence.
///
/// Saves are addressed by slot name. A slot holds the latest snapshot written
/// to it; saving again overwrites it.
pub trait SaveRepository: Send + Sync {
    /// Save a snapshot into `slot`.
    fn save(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<()>;

    /// Load the snapshot in `slot`, `None` if the slot is empty.
    fn load(&self, slot: &str) -> Result<Option<SessionSnapshot>>;

    /// Check if a slot holds a save.
    fn exists(&self, slot: &str) -> bool;

    /// Delete a slot. Deleting an empty slot is not an error.
    fn delete(&self, slot: &str) -> Result<()>;

    /// List all occupied slots, sorted.
    fn list_slots(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
