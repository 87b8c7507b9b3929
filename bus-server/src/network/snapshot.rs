//! JSON snapshot of the network on disk.
//!
//! Lets a restarted server plan routes without re-importing everything from
//! the provider first.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Route, Station};

use super::store::NetworkStore;

/// Errors writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("system time before unix epoch")]
    Clock,
}

/// On-disk format.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    /// Unix timestamp when the snapshot was written.
    saved_at_secs: u64,
    stations: Vec<Station>,
    routes: Vec<Route>,
}

/// A snapshot file location plus an optional maximum age.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    path: PathBuf,
    max_age: Option<Duration>,
}

impl NetworkSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: None,
        }
    }

    /// Treat snapshots older than `max_age` as absent.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Load the snapshot.
    ///
    /// Returns `None` if the file doesn't exist, can't be parsed (including
    /// stations or edges that fail validation), or is too old.
    pub fn load(&self) -> Option<NetworkStore> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let file: SnapshotFile = match serde_json::from_str(&contents) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt snapshot");
                return None;
            }
        };

        if let Some(max_age) = self.max_age {
            let now = unix_now().ok()?;
            if now.saturating_sub(file.saved_at_secs) >= max_age.as_secs() {
                return None;
            }
        }

        Some(NetworkStore::from_parts(file.stations, file.routes))
    }

    /// Save `store`, creating parent directories if needed.
    pub fn save(&self, store: &NetworkStore) -> Result<(), SnapshotError> {
        let file = SnapshotFile {
            saved_at_secs: unix_now()?,
            stations: store.stations().cloned().collect(),
            routes: store.routes().cloned().collect(),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&file)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unix_now() -> Result<u64, SnapshotError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| SnapshotError::Clock)
}
