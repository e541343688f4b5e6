//! Shared fixtures for engine tests.

use async_trait::async_trait;
use std::sync::Arc;

use super::{EngineContext, TicketDesk};
use crate::audit::{AuditEventType, AuditLogEntry, AuditRecorder, MemoryAuditSink};
use crate::config::TicketflowConfig;
use crate::domain::assignment::{DepartmentAssignment, DepartmentRequest, NewAssignment};
use crate::domain::ticket::{NewTicket, Ticket, TicketDraft};
use crate::domain::types::{
    Actor, ActorRole, AssignmentId, AssignmentStatus, Priority, ReferenceId, TicketId,
    TicketStatus, TimestampUtc, UserId,
};
use crate::store::{AssignmentStore, MemoryStore, StatusTransition, StoreError, TicketStore};

pub(crate) struct Harness {
    pub desk: TicketDesk,
    pub store: Arc<MemoryStore>,
    pub audit: Arc<MemoryAuditSink>,
}

pub(crate) fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let ctx = EngineContext::with_memory_store(
        store.clone(),
        AuditRecorder::new(audit.clone()),
        TicketflowConfig::default_config().catalog(),
    );
    Harness {
        desk: TicketDesk::new(ctx),
        store,
        audit,
    }
}

pub(crate) fn actor(role: ActorRole) -> Actor {
    Actor::new(UserId::new(), role)
}

pub(crate) fn client() -> Actor {
    actor(ActorRole::Client)
}

pub(crate) fn compliance() -> Actor {
    actor(ActorRole::Compliance)
}

pub(crate) fn manager() -> Actor {
    actor(ActorRole::Manager)
}

pub(crate) fn team_lead() -> Actor {
    actor(ActorRole::TeamLead)
}

pub(crate) fn draft(title: &str) -> TicketDraft {
    TicketDraft {
        title: title.to_string(),
        description: format!("{} - details", title),
        priority: Priority::High,
        contact_email: "client@example.com".to_string(),
        contact_phone: "555-0199".to_string(),
    }
}

pub(crate) fn departments(names: &[&str]) -> Vec<DepartmentRequest> {
    names.iter().map(|name| name.parse().unwrap()).collect()
}

impl Harness {
    pub async fn create(&self, owner: &Actor) -> Ticket {
        self.desk
            .lifecycle
            .create_ticket(draft("Resume overhaul"), owner)
            .await
            .unwrap()
    }

    /// Approves `ticket_id` for `names` and returns the created assignments.
    pub async fn approve(&self, ticket_id: TicketId, names: &[&str]) -> Vec<DepartmentAssignment> {
        self.desk
            .triage
            .approve_ticket(ticket_id, &departments(names), &compliance(), None)
            .await
            .unwrap();
        self.assignments(ticket_id).await
    }

    pub async fn assignments(&self, ticket_id: TicketId) -> Vec<DepartmentAssignment> {
        self.store
            .find_assignments_by_ticket_id(ticket_id)
            .await
            .unwrap()
    }

    pub async fn ticket(&self, ticket_id: TicketId) -> Ticket {
        self.store
            .find_ticket_by_id(ticket_id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn set_assignment(
        &self,
        assignment_id: AssignmentId,
        status: AssignmentStatus,
    ) -> DepartmentAssignment {
        self.desk
            .resolution
            .update_assignment_status(assignment_id, status, &team_lead(), None)
            .await
            .unwrap()
    }

    /// Drives a fresh ticket for `owner` all the way to `Closed`.
    pub async fn closed_ticket(&self, owner: &Actor) -> Ticket {
        let ticket = self.create(owner).await;
        for assignment in self.approve(ticket.id, &["Resume"]).await {
            self.set_assignment(assignment.id, AssignmentStatus::Resolved)
                .await;
        }
        self.desk
            .triage
            .close_ticket(ticket.id, &compliance())
            .await
            .unwrap()
    }

    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit.entries().await
    }

    pub async fn audit_types(&self) -> Vec<AuditEventType> {
        self.audit_entries()
            .await
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

/// Store whose backing service is down.
pub(crate) struct UnavailableStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl TicketStore for UnavailableStore {
    async fn find_ticket_by_id(&self, _id: TicketId) -> Result<Option<Ticket>, StoreError> {
        Err(down())
    }

    async fn find_tickets_by_reference_id(
        &self,
        _reference_id: ReferenceId,
    ) -> Result<Vec<Ticket>, StoreError> {
        Err(down())
    }

    async fn count_tickets_by_reference_id(
        &self,
        _reference_id: ReferenceId,
    ) -> Result<u32, StoreError> {
        Err(down())
    }

    async fn create_ticket(
        &self,
        _ticket: NewTicket,
        _at: TimestampUtc,
    ) -> Result<Ticket, StoreError> {
        Err(down())
    }

    async fn update_ticket_status(
        &self,
        _id: TicketId,
        _status: TicketStatus,
        _at: TimestampUtc,
    ) -> Result<Ticket, StoreError> {
        Err(down())
    }

    async fn transition_ticket_status(
        &self,
        _id: TicketId,
        _expected: TicketStatus,
        _status: TicketStatus,
        _at: TimestampUtc,
    ) -> Result<Ticket, StoreError> {
        Err(down())
    }

    async fn find_tickets_by_status(
        &self,
        _status: TicketStatus,
    ) -> Result<Vec<Ticket>, StoreError> {
        Err(down())
    }

    async fn find_tickets_by_client(&self, _client_id: UserId) -> Result<Vec<Ticket>, StoreError> {
        Err(down())
    }
}

#[async_trait]
impl AssignmentStore for UnavailableStore {
    async fn create_assignments_bulk(
        &self,
        _ticket_id: TicketId,
        _assignments: Vec<NewAssignment>,
        _transition: StatusTransition,
    ) -> Result<(Ticket, Vec<DepartmentAssignment>), StoreError> {
        Err(down())
    }

    async fn find_assignments_by_ticket_id(
        &self,
        _ticket_id: TicketId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError> {
        Err(down())
    }

    async fn find_assignment_by_id(
        &self,
        _id: AssignmentId,
    ) -> Result<Option<DepartmentAssignment>, StoreError> {
        Err(down())
    }

    async fn find_assignments_by_team_lead(
        &self,
        _team_lead_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError> {
        Err(down())
    }

    async fn count_unresolved_assignments(
        &self,
        _ticket_id: TicketId,
    ) -> Result<usize, StoreError> {
        Err(down())
    }

    async fn update_assignment(
        &self,
        _assignment: DepartmentAssignment,
        _at: TimestampUtc,
    ) -> Result<DepartmentAssignment, StoreError> {
        Err(down())
    }
}

/// Desk over a store that fails every call.
pub(crate) fn unavailable_desk() -> TicketDesk {
    let store = Arc::new(UnavailableStore);
    TicketDesk::new(EngineContext::new(
        store.clone(),
        store,
        AuditRecorder::new(Arc::new(MemoryAuditSink::new())),
        TicketflowConfig::default_config().catalog(),
    ))
}
