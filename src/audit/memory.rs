//! In-process audit sink.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuditError, AuditLogEntry, AuditSink};
use crate::domain::types::{ReferenceId, TicketId};

/// Keeps entries in append order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, oldest first.
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }

    async fn newest_first<F>(&self, keep: F) -> Vec<AuditLogEntry>
    where
        F: Fn(&AuditLogEntry) -> bool + Send,
    {
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|&e| keep(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn by_ticket(&self, ticket_id: TicketId) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self
            .newest_first(|e| e.ticket_id == Some(ticket_id))
            .await)
    }

    async fn by_reference(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self
            .newest_first(|e| e.reference_id == Some(reference_id))
            .await)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AuditError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
