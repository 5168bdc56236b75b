//! File-based TurnCounterRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::{Tick, TurnClockSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{RepositoryError, Result};
use super::traits::TurnCounterRepository;

/// Human-readable commit record for a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterManifest {
    pub session_id: String,
    pub global_tick: Tick,
    pub entities: usize,
    /// Payload file name, relative to the repository directory.
    pub payload: String,
    /// Hex-encoded SHA-256 of the payload bytes.
    pub digest: String,
}

/// File-based implementation of TurnCounterRepository.
///
/// Each save writes two files with a 2-phase commit:
/// 1. **Phase 1**: the bincode payload `counters_{session}_{tick}.bin`
/// 2. **Phase 2**: the JSON manifest `counters_{session}.json` naming that
///    payload and its digest (commit point)
///
/// A crash between the phases leaves the previous manifest and payload
/// intact. Superseded payloads are removed after the commit.
pub struct FileTurnCounterRepository {
    base_dir: PathBuf,
    session_id: String,
}

impl FileTurnCounterRepository {
    /// Create a new file-based repository for one game session.
    pub fn new(base_dir: impl AsRef<Path>, session_id: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self {
            base_dir,
            session_id: session_id.into(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("counters_{}.json", self.session_id))
    }

    fn payload_name(&self, tick: Tick) -> String {
        format!("counters_{}_{}.bin", self.session_id, tick.0)
    }

    /// Reads the current manifest without touching the payload.
    pub fn manifest(&self) -> Result<Option<CounterManifest>> {
        let path = self.manifest_path();

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let manifest: CounterManifest =
            serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))?;
        Ok(Some(manifest))
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut temp_path = path.as_os_str().to_owned();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, path).map_err(RepositoryError::Io)?;
        Ok(())
    }
}

fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl TurnCounterRepository for FileTurnCounterRepository {
    fn save(&self, snapshot: &TurnClockSnapshot) -> Result<()> {
        let previous = self.manifest()?;

        let bytes = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let payload = self.payload_name(snapshot.global_tick);
        Self::write_atomic(&self.base_dir.join(&payload), &bytes)?;

        let manifest = CounterManifest {
            session_id: self.session_id.clone(),
            global_tick: snapshot.global_tick,
            entities: snapshot.counters.len(),
            payload,
            digest: digest_hex(&bytes),
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        Self::write_atomic(&self.manifest_path(), json.as_bytes())?;

        if let Some(previous) = previous
            && previous.payload != manifest.payload
        {
            let stale = self.base_dir.join(&previous.payload);
            if let Err(error) = fs::remove_file(&stale) {
                tracing::warn!(path = %stale.display(), %error, "failed to remove stale counters");
            }
        }

        tracing::debug!(
            session = %self.session_id,
            global_tick = %manifest.global_tick,
            entities = manifest.entities,
            "saved turn counters"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<TurnClockSnapshot>> {
        let Some(manifest) = self.manifest()? else {
            return Ok(None);
        };

        let path = self.base_dir.join(&manifest.payload);
        let bytes = fs::read(&path).map_err(|e| {
            RepositoryError::CorruptedData(format!(
                "payload {} unreadable: {}",
                path.display(),
                e
            ))
        })?;

        let digest = digest_hex(&bytes);
        if digest != manifest.digest {
            return Err(RepositoryError::CorruptedData(format!(
                "digest mismatch for {}: expected {}, found {}",
                manifest.payload, manifest.digest, digest
            )));
        }

        let snapshot: TurnClockSnapshot = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        if snapshot.global_tick != manifest.global_tick {
            return Err(RepositoryError::CorruptedData(format!(
                "payload tick {} does not match manifest tick {}",
                snapshot.global_tick, manifest.global_tick
            )));
        }

        tracing::info!(
            session = %self.session_id,
            global_tick = %snapshot.global_tick,
            entities = snapshot.counters.len(),
            "loaded turn counters"
        );
        Ok(Some(snapshot))
    }
}
