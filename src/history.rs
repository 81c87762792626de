use crate::models::Snapshot;
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Where the previous run's facts live.
pub trait SnapshotStore {
    /// Never fails: anything unusable reads as an empty snapshot.
    fn load(&self) -> Snapshot;

    /// Replaces the stored snapshot. Returns `false` if the write failed.
    fn save(&self, snapshot: &Snapshot) -> bool;
}

pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn try_load(&self) -> Result<Snapshot> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Malformed history file: {}", self.path.display()))?;
        Ok(snapshot)
    }

    fn try_save(&self, snapshot: &Snapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))?;
        Ok(())
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Snapshot {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history file yet");
            return Snapshot::new();
        }
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("{:#}; starting from empty history", e);
                Snapshot::new()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> bool {
        match self.try_save(snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!("{:#}", e);
                false
            }
        }
    }
}

/// Keeps the snapshot in memory only.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshot: RefCell<Snapshot>,
}

impl MemorySnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Snapshot {
        self.snapshot()
    }

    fn save(&self, snapshot: &Snapshot) -> bool {
        *self.snapshot.borrow_mut() = snapshot.clone();
        true
    }
}
