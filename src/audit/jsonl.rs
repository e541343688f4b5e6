//! File-backed audit sink.
//!
//! Stores entries as JSONL (one JSON object per line). Appends take an
//! exclusive file lock and are synced before returning; reads take a shared
//! lock. A missing file reads as an empty log.

use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{AuditError, AuditLogEntry, AuditSink};
use crate::domain::types::{ReferenceId, TicketId};

#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    /// Path to the JSONL audit log.
    pub log_path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Reads every entry, oldest first.
    pub fn read_all(&self) -> Result<Vec<AuditLogEntry>, AuditError> {
        read_entries(&self.log_path)
    }

    fn newest_first<F>(&self, keep: F) -> Result<Vec<AuditLogEntry>, AuditError>
    where
        F: Fn(&AuditLogEntry) -> bool,
    {
        let mut entries: Vec<AuditLogEntry> = self.read_all()?.into_iter().filter(keep).collect();
        entries.reverse();
        Ok(entries)
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.lock_exclusive()?;

        let line = serde_json::to_string(&entry)?;
        writeln!(file, "{}", line)?;

        // Ensure the entry is durable before the transition returns
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    async fn by_ticket(&self, ticket_id: TicketId) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.newest_first(|e| e.ticket_id == Some(ticket_id))
    }

    async fn by_reference(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.newest_first(|e| e.reference_id == Some(reference_id))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AuditError> {
        let mut entries = self.newest_first(|_| true)?;
        entries.truncate(limit);
        Ok(entries)
    }
}

fn read_entries(path: &Path) -> Result<Vec<AuditLogEntry>, AuditError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AuditError::Io(e)),
    };

    file.lock_shared()?;

    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "tests/jsonl_tests.rs"]
mod tests;
