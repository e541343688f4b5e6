//! Ticket events for the status state machine.
//!
//! Events represent facts that have happened to a ticket. Each one moves the
//! aggregate's status and becomes one audit log entry.

use crate::domain::assignment::NewAssignment;
use crate::domain::types::{DepartmentName, TicketStatus, TimestampUtc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

/// Events emitted by the ticket aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketEvent {
    /// Ticket passed compliance review.
    TicketApproved {
        departments: Vec<NewAssignment>,
        reason: Option<String>,
        approved_at: TimestampUtc,
    },

    /// Department assignments were requested for the ticket.
    DepartmentsAssigned {
        departments: Vec<DepartmentName>,
        assigned_at: TimestampUtc,
    },

    /// Ticket was rejected during compliance review.
    TicketRejected {
        reason: Option<String>,
        rejected_at: TimestampUtc,
    },

    /// Status moved as a consequence of assignment activity.
    StatusChanged {
        from: TicketStatus,
        to: TicketStatus,
        changed_at: TimestampUtc,
    },

    /// Ticket was closed after final review.
    TicketClosed { closed_at: TimestampUtc },
}

impl TicketEvent {
    /// When the fact happened.
    pub fn occurred_at(&self) -> TimestampUtc {
        match self {
            Self::TicketApproved { approved_at, .. } => *approved_at,
            Self::DepartmentsAssigned { assigned_at, .. } => *assigned_at,
            Self::TicketRejected { rejected_at, .. } => *rejected_at,
            Self::StatusChanged { changed_at, .. } => *changed_at,
            Self::TicketClosed { closed_at } => *closed_at,
        }
    }
}

impl DomainEvent for TicketEvent {
    fn event_type(&self) -> String {
        match self {
            Self::TicketApproved { .. } => "TicketApproved".to_string(),
            Self::DepartmentsAssigned { .. } => "DepartmentsAssigned".to_string(),
            Self::TicketRejected { .. } => "TicketRejected".to_string(),
            Self::StatusChanged { .. } => "StatusChanged".to_string(),
            Self::TicketClosed { .. } => "TicketClosed".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1".to_string()
    }
}
