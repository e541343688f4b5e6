//! In-process store backed by one `tokio::sync::RwLock`.
//!
//! Guards run while the write lock is held, so concurrent callers observe
//! them atomically.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AssignmentStore, StatusTransition, StoreError, StoreSnapshot, TicketStore};
use crate::domain::assignment::{DepartmentAssignment, NewAssignment};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::domain::types::{
    AssignmentId, AssignmentStatus, ReferenceId, TicketId, TicketStatus, TimestampUtc, UserId,
};

/// Tickets and assignments held in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store from a previously exported snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Copies the current contents for persistence.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().await.clone()
    }
}

fn apply_status(ticket: &mut Ticket, status: TicketStatus, at: TimestampUtc) {
    ticket.status = status;
    ticket.updated_at = at;
    if status == TicketStatus::Closed {
        ticket.closed_at = Some(at);
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn find_ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
        let data = self.inner.read().await;
        Ok(data.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tickets_by_reference_id(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<Ticket>, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .tickets
            .iter()
            .filter(|t| t.reference_id == reference_id)
            .cloned()
            .collect())
    }

    async fn count_tickets_by_reference_id(
        &self,
        reference_id: ReferenceId,
    ) -> Result<u32, StoreError> {
        let data = self.inner.read().await;
        let count = data
            .tickets
            .iter()
            .filter(|t| t.reference_id == reference_id)
            .count();
        u32::try_from(count).map_err(|_| {
            StoreError::Unavailable(format!("reference {} chain too long", reference_id))
        })
    }

    async fn create_ticket(&self, new: NewTicket, at: TimestampUtc) -> Result<Ticket, StoreError> {
        let mut data = self.inner.write().await;

        let open_sibling = data
            .tickets
            .iter()
            .any(|t| t.reference_id == new.reference_id && t.is_open());
        if open_sibling {
            return Err(StoreError::OpenGenerationExists(new.reference_id));
        }

        let ticket = Ticket {
            id: TicketId::new(),
            reference_id: new.reference_id,
            parent_ticket_id: new.parent_ticket_id,
            client_id: new.client_id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            status: new.status,
            reopen_count: new.reopen_count,
            warning_flag: new.warning_flag,
            contact_email: new.contact_email,
            contact_phone: new.contact_phone,
            closed_at: None,
            created_at: at,
            updated_at: at,
        };
        data.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        at: TimestampUtc,
    ) -> Result<Ticket, StoreError> {
        let mut data = self.inner.write().await;
        let ticket = data
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::MissingTicket(id))?;
        apply_status(ticket, status, at);
        Ok(ticket.clone())
    }

    async fn transition_ticket_status(
        &self,
        id: TicketId,
        expected: TicketStatus,
        status: TicketStatus,
        at: TimestampUtc,
    ) -> Result<Ticket, StoreError> {
        let mut data = self.inner.write().await;
        let ticket = data
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::MissingTicket(id))?;
        if ticket.status != expected {
            return Err(StoreError::StatusMismatch {
                ticket_id: id,
                expected,
                actual: ticket.status,
            });
        }
        apply_status(ticket, status, at);
        Ok(ticket.clone())
    }

    async fn find_tickets_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .tickets
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn find_tickets_by_client(&self, client_id: UserId) -> Result<Vec<Ticket>, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .tickets
            .iter()
            .rev()
            .filter(|t| t.client_id == client_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn create_assignments_bulk(
        &self,
        ticket_id: TicketId,
        assignments: Vec<NewAssignment>,
        transition: StatusTransition,
    ) -> Result<(Ticket, Vec<DepartmentAssignment>), StoreError> {
        let mut data = self.inner.write().await;

        if data.assignments.iter().any(|a| a.ticket_id == ticket_id) {
            return Err(StoreError::DuplicateAssignments(ticket_id));
        }
        let ticket = data
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or(StoreError::MissingTicket(ticket_id))?;
        if ticket.status != transition.expected {
            return Err(StoreError::StatusMismatch {
                ticket_id,
                expected: transition.expected,
                actual: ticket.status,
            });
        }
        apply_status(ticket, transition.status, transition.at);
        let ticket = ticket.clone();

        let created: Vec<DepartmentAssignment> = assignments
            .into_iter()
            .map(|new| DepartmentAssignment {
                id: AssignmentId::new(),
                ticket_id,
                department: new.department,
                branch: new.branch,
                assigned_manager_id: None,
                assigned_team_lead_id: None,
                status: AssignmentStatus::NotAssigned,
                review_notes: None,
                resolved_at: None,
                created_at: transition.at,
                updated_at: transition.at,
            })
            .collect();
        data.assignments.extend(created.iter().cloned());
        Ok((ticket, created))
    }

    async fn find_assignments_by_ticket_id(
        &self,
        ticket_id: TicketId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .assignments
            .iter()
            .filter(|a| a.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn find_assignment_by_id(
        &self,
        id: AssignmentId,
    ) -> Result<Option<DepartmentAssignment>, StoreError> {
        let data = self.inner.read().await;
        Ok(data.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_assignments_by_team_lead(
        &self,
        team_lead_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .assignments
            .iter()
            .filter(|a| a.assigned_team_lead_id == Some(team_lead_id))
            .cloned()
            .collect())
    }

    async fn count_unresolved_assignments(
        &self,
        ticket_id: TicketId,
    ) -> Result<usize, StoreError> {
        let data = self.inner.read().await;
        Ok(data
            .assignments
            .iter()
            .filter(|a| a.ticket_id == ticket_id && !a.is_resolved())
            .count())
    }

    async fn update_assignment(
        &self,
        assignment: DepartmentAssignment,
        at: TimestampUtc,
    ) -> Result<DepartmentAssignment, StoreError> {
        let mut data = self.inner.write().await;
        let stored = data
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or(StoreError::MissingAssignment(assignment.id))?;
        *stored = DepartmentAssignment {
            updated_at: at,
            ..assignment
        };
        Ok(stored.clone())
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
