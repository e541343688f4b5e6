//! Ticket entity and the shapes used to create new generations.

use serde::{Deserialize, Serialize};

use crate::domain::assignment::{AssignmentSummary, DepartmentAssignment};
use crate::domain::types::{Priority, ReferenceId, TicketId, TicketStatus, TimestampUtc, UserId};

/// One generation of a support issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub reference_id: ReferenceId,
    pub parent_ticket_id: Option<TicketId>,
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub reopen_count: u32,
    pub warning_flag: bool,
    pub contact_email: String,
    pub contact_phone: String,
    pub closed_at: Option<TimestampUtc>,
    pub created_at: TimestampUtc,
    pub updated_at: TimestampUtc,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_owned_by(&self, client_id: &UserId) -> bool {
        self.client_id == *client_id
    }
}

/// Client-supplied ticket content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub contact_email: String,
    pub contact_phone: String,
}

/// A ticket ready to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub reference_id: ReferenceId,
    pub parent_ticket_id: Option<TicketId>,
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub reopen_count: u32,
    pub warning_flag: bool,
    pub contact_email: String,
    pub contact_phone: String,
}

impl NewTicket {
    /// First generation of a fresh chain.
    pub fn original(draft: TicketDraft, client_id: UserId) -> Self {
        Self {
            reference_id: ReferenceId::new(),
            parent_ticket_id: None,
            client_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: TicketStatus::InComplianceReview,
            reopen_count: 0,
            warning_flag: false,
            contact_email: draft.contact_email,
            contact_phone: draft.contact_phone,
        }
    }

    /// Next generation of `source`'s chain.
    ///
    /// `chain_len` is the number of tickets already sharing the reference id,
    /// which is also the new generation's reopen count.
    pub fn sister_of(source: &Ticket, chain_len: u32) -> Self {
        Self {
            reference_id: source.reference_id,
            parent_ticket_id: Some(source.id),
            client_id: source.client_id,
            title: source.title.clone(),
            description: source.description.clone(),
            priority: source.priority,
            status: TicketStatus::InComplianceReview,
            reopen_count: chain_len,
            warning_flag: chain_len > 0,
            contact_email: source.contact_email.clone(),
            contact_phone: source.contact_phone.clone(),
        }
    }
}

/// A ticket together with its department assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub assignments: Vec<DepartmentAssignment>,
}

/// Entry of the ready-to-close review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyToCloseEntry {
    pub ticket: Ticket,
    pub assignments: Vec<AssignmentSummary>,
}
