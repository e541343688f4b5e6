//! Append-only audit log of ticket and assignment transitions.
//!
//! Engines hand entries to an [`AuditRecorder`], which writes them to an
//! [`AuditSink`]. A failed write is logged and swallowed so it never fails
//! or reverses the transition being recorded.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlAuditSink;
pub use memory::MemoryAuditSink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::cqrs::TicketEvent;
use crate::domain::services::TicketClock;
use crate::domain::ticket::Ticket;
use crate::domain::types::{
    Actor, ActorRole, AuditEntryId, ReferenceId, TicketId, TimestampUtc, UserId,
};

/// Fixed enumeration of audit event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Ticket lifecycle
    TicketCreated,
    TicketApproved,
    TicketRejected,
    TicketClosed,
    TicketStatusChanged,

    // Reopen flow
    TicketReopenRequested,
    SisterTicketCreated,
    ReopenCountUpdated,
    WarningFlagSet,

    // Department assignments
    DepartmentsAssigned,
    TeamLeadAssigned,
    AssignmentStatusUpdated,
    AssignmentResolved,

    // Compliance actions
    ComplianceDecision,
    FinalReviewCompleted,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "TICKET_CREATED",
            Self::TicketApproved => "TICKET_APPROVED",
            Self::TicketRejected => "TICKET_REJECTED",
            Self::TicketClosed => "TICKET_CLOSED",
            Self::TicketStatusChanged => "TICKET_STATUS_CHANGED",
            Self::TicketReopenRequested => "TICKET_REOPEN_REQUESTED",
            Self::SisterTicketCreated => "SISTER_TICKET_CREATED",
            Self::ReopenCountUpdated => "REOPEN_COUNT_UPDATED",
            Self::WarningFlagSet => "WARNING_FLAG_SET",
            Self::DepartmentsAssigned => "DEPARTMENTS_ASSIGNED",
            Self::TeamLeadAssigned => "TEAM_LEAD_ASSIGNED",
            Self::AssignmentStatusUpdated => "ASSIGNMENT_STATUS_UPDATED",
            Self::AssignmentResolved => "ASSIGNMENT_RESOLVED",
            Self::ComplianceDecision => "COMPLIANCE_DECISION",
            Self::FinalReviewCompleted => "FINAL_REVIEW_COMPLETED",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TicketEvent> for AuditEventType {
    fn from(event: &TicketEvent) -> Self {
        match event {
            TicketEvent::TicketApproved { .. } => Self::TicketApproved,
            TicketEvent::DepartmentsAssigned { .. } => Self::DepartmentsAssigned,
            TicketEvent::TicketRejected { .. } => Self::TicketRejected,
            TicketEvent::StatusChanged { .. } => Self::TicketStatusChanged,
            TicketEvent::TicketClosed { .. } => Self::TicketClosed,
        }
    }
}

/// A recorded audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub event_type: AuditEventType,
    pub ticket_id: Option<TicketId>,
    pub reference_id: Option<ReferenceId>,
    pub actor_id: UserId,
    pub actor_role: ActorRole,
    #[serde(default)]
    pub payload: Value,
    pub decision_reason: Option<String>,
    pub recorded_at: TimestampUtc,
}

/// An audit entry before the recorder stamps id and time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub event_type: AuditEventType,
    pub ticket_id: Option<TicketId>,
    pub reference_id: Option<ReferenceId>,
    pub actor: Actor,
    pub payload: Value,
    pub decision_reason: Option<String>,
}

impl NewAuditEntry {
    pub fn new(event_type: AuditEventType, actor: &Actor) -> Self {
        Self {
            event_type,
            ticket_id: None,
            reference_id: None,
            actor: *actor,
            payload: json!({}),
            decision_reason: None,
        }
    }

    /// Entry attached to `ticket` and its reference chain.
    pub fn for_ticket(event_type: AuditEventType, ticket: &Ticket, actor: &Actor) -> Self {
        Self::new(event_type, actor)
            .ticket(ticket.id)
            .reference(ticket.reference_id)
    }

    /// Entry describing a state-machine event on `ticket`.
    pub fn from_ticket_event(ticket: &Ticket, event: &TicketEvent, actor: &Actor) -> Self {
        let entry = Self::for_ticket(AuditEventType::from(event), ticket, actor);
        match event {
            TicketEvent::TicketApproved {
                departments,
                reason,
                ..
            } => entry
                .payload(json!({ "departments": departments }))
                .reason(reason.clone()),
            TicketEvent::DepartmentsAssigned { departments, .. } => {
                entry.payload(json!({ "departments": departments }))
            }
            TicketEvent::TicketRejected { reason, .. } => entry
                .payload(json!({ "status": ticket.status }))
                .reason(reason.clone()),
            TicketEvent::StatusChanged { from, to, .. } => {
                entry.payload(json!({ "from": from, "to": to }))
            }
            TicketEvent::TicketClosed { closed_at } => {
                entry.payload(json!({ "closed_at": closed_at }))
            }
        }
    }

    pub fn ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }

    pub fn reference(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn reason(mut self, reason: Option<String>) -> Self {
        self.decision_reason = reason;
        self
    }

    fn into_entry(self, recorded_at: TimestampUtc) -> AuditLogEntry {
        AuditLogEntry {
            id: AuditEntryId::new(),
            event_type: self.event_type,
            ticket_id: self.ticket_id,
            reference_id: self.reference_id,
            actor_id: self.actor.id,
            actor_role: self.actor.role,
            payload: self.payload,
            decision_reason: self.decision_reason,
            recorded_at,
        }
    }
}

/// Failures reported by audit sinks.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable destination for audit entries.
///
/// Reads return newest entries first.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError>;

    async fn by_ticket(&self, ticket_id: TicketId) -> Result<Vec<AuditLogEntry>, AuditError>;

    async fn by_reference(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<AuditLogEntry>, AuditError>;

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AuditError>;
}

/// Records audit entries without ever failing the caller.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    clock: TicketClock,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            clock: TicketClock::default(),
        }
    }

    /// Stamps entries from `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: TicketClock) -> Self {
        self.clock = clock;
        self
    }

    /// Appends `entry`, returning the stored entry or `None` if the sink failed.
    pub async fn record(&self, entry: NewAuditEntry) -> Option<AuditLogEntry> {
        let entry = entry.into_entry(self.clock.now());
        match self.sink.append(entry.clone()).await {
            Ok(()) => {
                tracing::debug!(
                    event_type = %entry.event_type,
                    ticket_id = ?entry.ticket_id,
                    "audit entry recorded"
                );
                Some(entry)
            }
            Err(e) => {
                tracing::error!(
                    event_type = %entry.event_type,
                    ticket_id = ?entry.ticket_id,
                    error = %e,
                    "audit write failed"
                );
                None
            }
        }
    }

    /// Records one entry per state-machine event, in order.
    pub async fn record_ticket_events(
        &self,
        ticket: &Ticket,
        events: &[TicketEvent],
        actor: &Actor,
    ) {
        for event in events {
            self.record(NewAuditEntry::from_ticket_event(ticket, event, actor))
                .await;
        }
    }

    pub async fn by_ticket(&self, ticket_id: TicketId) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.sink.by_ticket(ticket_id).await
    }

    pub async fn by_reference(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.sink.by_reference(reference_id).await
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.sink.recent(limit).await
    }
}

impl fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/recorder_tests.rs"]
mod tests;
