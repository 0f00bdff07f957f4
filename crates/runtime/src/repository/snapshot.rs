//! Persisted session shape and the checksummed envelope around it.

use echoes_core::{CharacterSnapshot, TimelineSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{RepositoryError, Result};

/// Current save format version.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild a session: the shared timeline and every
/// character. Listeners and observers are runtime wiring and are not saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub session_id: String,
    pub timeline: TimelineSnapshot,
    pub characters: Vec<CharacterSnapshot>,
}

/// On-disk wrapper: format version, SHA-256 of the payload, payload bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub digest: [u8; 32],
    pub payload: Vec<u8>,
}

impl SaveEnvelope {
    /// Encodes `snapshot` at the current format version.
    pub fn seal(snapshot: &SessionSnapshot) -> Result<Self> {
        let payload = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Self {
            version: SAVE_FORMAT_VERSION,
            digest: digest(&payload),
            payload,
        })
    }

    /// Verifies the digest and decodes the payload.
    pub fn open(&self, slot: &str) -> Result<SessionSnapshot> {
        if digest(&self.payload) != self.digest {
            return Err(RepositoryError::ChecksumMismatch {
                slot: slot.to_string(),
            });
        }
        let mut snapshot: SessionSnapshot = match self.version {
            1 => bincode::deserialize(&self.payload)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            found => {
                return Err(RepositoryError::UnsupportedVersion {
                    found,
                    supported: SAVE_FORMAT_VERSION,
                });
            }
        };
        snapshot.version = SAVE_FORMAT_VERSION;
        Ok(snapshot)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }
}

fn digest(payload: &[u8]) -> [u8; 32] {
    Sha256::digest(payload).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoes_core::TimelineState;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            version: SAVE_FORMAT_VERSION,
            session_id: "test".into(),
            timeline: TimelineState::default().snapshot(),
            characters: Vec::new(),
        }
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let mut envelope = SaveEnvelope::seal(&snapshot()).expect("seal");
        if let Some(byte) = envelope.payload.last_mut() {
            *byte ^= 0xff;
        }
        assert!(matches!(
            envelope.open("slot"),
            Err(RepositoryError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut envelope = SaveEnvelope::seal(&snapshot()).expect("seal");
        envelope.version = SAVE_FORMAT_VERSION + 1;
        assert!(matches!(
            envelope.open("slot"),
            Err(RepositoryError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn digest_hex_is_sha256_width() {
        let envelope = SaveEnvelope::seal(&snapshot()).expect("seal");
        assert_eq!(envelope.digest_hex().len(), 64);
        assert_eq!(envelope.open("slot").expect("open"), snapshot());
    }
}
