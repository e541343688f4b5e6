//! Assignment updates and the fan-in of assignment status back to the ticket.
//!
//! After an assignment is persisted the ticket is re-read and moved:
//! - an assignment waiting on the client puts the ticket in `Waiting for Client`
//! - work resuming on a waiting ticket puts it back `In Resolution`
//! - zero unresolved assignments make it `Ready to Close`, overriding the above
//!
//! Ticket writes here are compare-and-set against the status just read. A
//! mismatch means another request moved the ticket first and the derived
//! change is skipped.

use serde_json::json;

use super::EngineContext;
use crate::audit::{AuditEventType, NewAuditEntry};
use crate::domain::assignment::DepartmentAssignment;
use crate::domain::authorization::{authorize, Operation};
use crate::domain::cqrs::TicketCommand;
use crate::domain::errors::TicketError;
use crate::domain::ticket::Ticket;
use crate::domain::types::{Actor, AssignmentId, AssignmentStatus, TicketStatus, UserId};
use crate::store::StoreError;

#[derive(Clone, Debug)]
pub struct ResolutionAggregator {
    ctx: EngineContext,
}

impl ResolutionAggregator {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Moves an assignment to `new_status` and synchronizes its ticket.
    pub async fn update_assignment_status(
        &self,
        assignment_id: AssignmentId,
        new_status: AssignmentStatus,
        actor: &Actor,
        review_notes: Option<String>,
    ) -> Result<DepartmentAssignment, TicketError> {
        authorize(actor, Operation::UpdateAssignmentStatus)?;

        if !new_status.is_caller_settable() {
            return Err(TicketError::invalid_input(format!(
                "assignment status cannot be set to {}",
                new_status
            )));
        }

        let mut assignment = self.ctx.load_assignment(assignment_id).await?;

        if let Some(lead) = assignment.assigned_team_lead_id {
            if lead != actor.id {
                tracing::warn!(
                    assignment_id = %assignment_id,
                    actor_id = %actor.id,
                    "assignment update refused: not the assigned team lead"
                );
                return Err(TicketError::unauthorized(
                    "assignment belongs to another team lead",
                ));
            }
        }

        let ticket = self.ctx.load_ticket(assignment.ticket_id).await?;
        if ticket.status == TicketStatus::Closed {
            return Err(TicketError::invalid_state(
                "assignments of a closed ticket are read-only",
            ));
        }

        let now = self.ctx.now();
        let old_status = assignment.set_status(new_status, review_notes, now);
        let assignment = self
            .ctx
            .assignments
            .update_assignment(assignment, now)
            .await?;

        self.ctx
            .audit
            .record(
                NewAuditEntry::for_ticket(AuditEventType::AssignmentStatusUpdated, &ticket, actor)
                    .payload(json!({
                        "assignment_id": assignment.id,
                        "department": assignment.department,
                        "old_status": old_status,
                        "new_status": new_status,
                    })),
            )
            .await;

        tracing::info!(
            assignment_id = %assignment.id,
            ticket_id = %assignment.ticket_id,
            from = %old_status,
            to = %new_status,
            "assignment status updated"
        );

        self.sync_ticket(&assignment, actor).await?;
        Ok(assignment)
    }

    /// Recomputes the ticket status after an assignment change.
    async fn sync_ticket(
        &self,
        assignment: &DepartmentAssignment,
        actor: &Actor,
    ) -> Result<(), TicketError> {
        let system = actor.as_system();
        let mut ticket = self.ctx.load_ticket(assignment.ticket_id).await?;

        let follow_up = match assignment.status {
            AssignmentStatus::WaitingForClient => Some(TicketCommand::AwaitClient),
            AssignmentStatus::InProgress => Some(TicketCommand::ResumeResolution),
            AssignmentStatus::NotAssigned | AssignmentStatus::Resolved => None,
        };
        if let Some(command) = follow_up {
            ticket = self.apply_derived(ticket, command, &system).await?;
        }

        // Counted after the assignment write so the last resolver sees zero
        let unresolved = self
            .ctx
            .assignments
            .count_unresolved_assignments(assignment.ticket_id)
            .await?;
        if unresolved == 0 {
            self.apply_derived(ticket, TicketCommand::MarkReadyToClose, &system)
                .await?;
        }
        Ok(())
    }

    /// Runs a derived command and persists its status change, if any.
    ///
    /// Returns the ticket as it now stands.
    async fn apply_derived(
        &self,
        ticket: Ticket,
        command: TicketCommand,
        system: &Actor,
    ) -> Result<Ticket, TicketError> {
        let (aggregate, events) = match self.ctx.decide(&ticket, command).await {
            Ok(outcome) => outcome,
            Err(TicketError::InvalidState { message }) => {
                tracing::warn!(ticket_id = %ticket.id, %message, "derived transition skipped");
                return Ok(ticket);
            }
            Err(e) => return Err(e),
        };

        let target = match aggregate.status() {
            Some(status) if !events.is_empty() && status != ticket.status => status,
            _ => {
                tracing::debug!(
                    ticket_id = %ticket.id,
                    status = %ticket.status,
                    "ticket status already in sync"
                );
                return Ok(ticket);
            }
        };

        let updated = match self
            .ctx
            .tickets
            .transition_ticket_status(
                ticket.id,
                ticket.status,
                target,
                self.ctx.occurred_at(&events),
            )
            .await
        {
            Ok(updated) => updated,
            Err(StoreError::StatusMismatch { actual, .. }) => {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    expected = %ticket.status,
                    %actual,
                    "ticket moved concurrently; derived transition skipped"
                );
                return self.ctx.load_ticket(ticket.id).await;
            }
            Err(e) => return Err(e.into()),
        };

        self.ctx
            .audit
            .record_ticket_events(&updated, &events, system)
            .await;

        tracing::info!(
            ticket_id = %updated.id,
            from = %ticket.status,
            to = %updated.status,
            "ticket status synchronized"
        );
        Ok(updated)
    }

    /// Records the manager and team lead responsible for an assignment.
    pub async fn assign_team_lead(
        &self,
        assignment_id: AssignmentId,
        team_lead_id: UserId,
        actor: &Actor,
    ) -> Result<DepartmentAssignment, TicketError> {
        authorize(actor, Operation::AssignTeamLead)?;

        let mut assignment = self.ctx.load_assignment(assignment_id).await?;
        let ticket = self.ctx.load_ticket(assignment.ticket_id).await?;
        if ticket.status == TicketStatus::Closed {
            return Err(TicketError::invalid_state(
                "assignments of a closed ticket are read-only",
            ));
        }

        assignment.assign_team_lead(actor.id, team_lead_id);
        let assignment = self
            .ctx
            .assignments
            .update_assignment(assignment, self.ctx.now())
            .await?;

        self.ctx
            .audit
            .record(
                NewAuditEntry::for_ticket(AuditEventType::TeamLeadAssigned, &ticket, actor)
                    .payload(json!({
                        "assignment_id": assignment.id,
                        "department": assignment.department,
                        "team_lead_id": team_lead_id,
                    })),
            )
            .await;

        tracing::info!(
            assignment_id = %assignment.id,
            team_lead_id = %team_lead_id,
            "team lead assigned"
        );
        Ok(assignment)
    }

    /// A team lead's work list, oldest first.
    pub async fn team_lead_assignments(
        &self,
        team_lead_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, TicketError> {
        Ok(self
            .ctx
            .assignments
            .find_assignments_by_team_lead(team_lead_id)
            .await?)
    }
}

#[cfg(test)]
#[path = "tests/resolution_tests.rs"]
mod tests;
