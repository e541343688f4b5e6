//! JSON snapshot persistence for the memory store.
//!
//! Snapshots are written atomically via temp file + rename. Processes that
//! load, mutate and save a snapshot serialize on an advisory `StoreLock`.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use super::StoreError;
use crate::domain::assignment::DepartmentAssignment;
use crate::domain::ticket::Ticket;

/// Full store contents, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub assignments: Vec<DepartmentAssignment>,
}

/// Loads a snapshot from disk. A missing file is an empty store.
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreSnapshot::default()),
        Err(e) => return Err(StoreError::Io(e)),
    };

    Ok(serde_json::from_str(&content)?)
}

/// Saves a snapshot to disk atomically.
pub fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(snapshot)?;

    // Write to temp file, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    tracing::debug!(
        path = %path.display(),
        tickets = snapshot.tickets.len(),
        assignments = snapshot.assignments.len(),
        "saved store snapshot"
    );
    Ok(())
}

/// Exclusive advisory lock held for the duration of a load-mutate-save cycle.
///
/// Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Blocks until the lock file at `path` can be locked exclusively.
    pub fn acquire(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, "failed to release store lock");
        }
    }
}

#[cfg(test)]
#[path = "tests/snapshot_tests.rs"]
mod tests;
