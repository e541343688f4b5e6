//! Store collaborator interfaces for tickets and department assignments.
//!
//! The engines never hold a lock across two store calls. Every invariant
//! that two concurrent requests could race on is a guard evaluated inside a
//! single store call:
//! - `create_ticket` refuses a second open generation in a reference chain
//! - `create_assignments_bulk` refuses a ticket that already has assignments,
//!   and commits the fan-out only together with the ticket's status move
//! - `transition_ticket_status` is a compare-and-set on the ticket status

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{load_snapshot, save_snapshot, StoreLock, StoreSnapshot};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::assignment::{DepartmentAssignment, NewAssignment};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::domain::types::{
    AssignmentId, ReferenceId, TicketId, TicketStatus, TimestampUtc, UserId,
};

/// Failures reported by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("ticket {0} does not exist")]
    MissingTicket(TicketId),

    #[error("assignment {0} does not exist")]
    MissingAssignment(AssignmentId),

    /// Bulk insert guard: the ticket already has assignments.
    #[error("ticket {0} already has department assignments")]
    DuplicateAssignments(TicketId),

    /// Insert guard: the chain already has a non-closed generation.
    #[error("reference {0} already has an open ticket")]
    OpenGenerationExists(ReferenceId),

    /// Compare-and-set guard on ticket status.
    #[error("ticket {ticket_id} is {actual}, expected {expected}")]
    StatusMismatch {
        ticket_id: TicketId,
        expected: TicketStatus,
        actual: TicketStatus,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A compare-and-set ticket status move carried by another write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub expected: TicketStatus,
    pub status: TicketStatus,
    pub at: TimestampUtc,
}

/// Ticket persistence.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn find_ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError>;

    /// Every generation sharing `reference_id`, oldest first.
    async fn find_tickets_by_reference_id(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<Ticket>, StoreError>;

    async fn count_tickets_by_reference_id(
        &self,
        reference_id: ReferenceId,
    ) -> Result<u32, StoreError>;

    /// Inserts a ticket created at `at`, assigning its id.
    ///
    /// Fails with `OpenGenerationExists` when another ticket in the same
    /// reference chain is not `Closed`.
    async fn create_ticket(&self, ticket: NewTicket, at: TimestampUtc)
        -> Result<Ticket, StoreError>;

    /// Unconditionally sets the status. Moving to `Closed` stamps `closed_at`.
    async fn update_ticket_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        at: TimestampUtc,
    ) -> Result<Ticket, StoreError>;

    /// Sets the status only if it currently equals `expected`.
    async fn transition_ticket_status(
        &self,
        id: TicketId,
        expected: TicketStatus,
        status: TicketStatus,
        at: TimestampUtc,
    ) -> Result<Ticket, StoreError>;

    /// Tickets in `status`, oldest first.
    async fn find_tickets_by_status(&self, status: TicketStatus)
        -> Result<Vec<Ticket>, StoreError>;

    /// Tickets raised by `client_id`, newest first.
    async fn find_tickets_by_client(&self, client_id: UserId) -> Result<Vec<Ticket>, StoreError>;
}

/// Department assignment persistence.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Inserts every assignment for a ticket, all `NotAssigned`, and applies
    /// `transition` to the ticket in the same step.
    ///
    /// Nothing is written unless both succeed. Fails with
    /// `DuplicateAssignments` if the ticket already has any, and with
    /// `StatusMismatch` if the ticket is no longer in `transition.expected`.
    async fn create_assignments_bulk(
        &self,
        ticket_id: TicketId,
        assignments: Vec<NewAssignment>,
        transition: StatusTransition,
    ) -> Result<(Ticket, Vec<DepartmentAssignment>), StoreError>;

    async fn find_assignments_by_ticket_id(
        &self,
        ticket_id: TicketId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError>;

    async fn find_assignment_by_id(
        &self,
        id: AssignmentId,
    ) -> Result<Option<DepartmentAssignment>, StoreError>;

    /// Assignments worked by `team_lead_id`, oldest first.
    async fn find_assignments_by_team_lead(
        &self,
        team_lead_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError>;

    async fn count_unresolved_assignments(&self, ticket_id: TicketId)
        -> Result<usize, StoreError>;

    /// Replaces the stored assignment with the same id, stamping `updated_at`.
    async fn update_assignment(
        &self,
        assignment: DepartmentAssignment,
        at: TimestampUtc,
    ) -> Result<DepartmentAssignment, StoreError>;
}
