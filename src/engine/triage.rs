//! Compliance triage: approval with department fan-out, rejection, final closure.

use super::EngineContext;
use crate::domain::assignment::DepartmentRequest;
use crate::domain::authorization::{authorize, Operation};
use crate::domain::cqrs::TicketCommand;
use crate::domain::errors::TicketError;
use crate::domain::ticket::{ReadyToCloseEntry, Ticket};
use crate::domain::types::{Actor, TicketId, TicketStatus};
use crate::store::StatusTransition;

#[derive(Clone, Debug)]
pub struct TriageEngine {
    ctx: EngineContext,
}

impl TriageEngine {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Approves a ticket and creates one assignment per requested department.
    ///
    /// Existing assignments are checked before the status so that approving
    /// an already approved ticket is a `Conflict` rather than `InvalidState`.
    /// The assignments and the move to `In Resolution` commit in one store
    /// call; a reject that lands first leaves no assignments behind.
    pub async fn approve_ticket(
        &self,
        ticket_id: TicketId,
        departments: &[DepartmentRequest],
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<TicketId, TicketError> {
        authorize(actor, Operation::ApproveTicket)?;

        let ticket = self.ctx.load_ticket(ticket_id).await?;

        let existing = self
            .ctx
            .assignments
            .find_assignments_by_ticket_id(ticket_id)
            .await?;
        if !existing.is_empty() {
            return Err(TicketError::conflict(
                "departments already assigned for this ticket",
            ));
        }

        if ticket.status != TicketStatus::InComplianceReview {
            return Err(TicketError::invalid_state(format!(
                "ticket is not in compliance review (status: {})",
                ticket.status
            )));
        }

        let resolved = self.ctx.catalog.resolve(departments)?;

        let (aggregate, events) = self
            .ctx
            .decide(
                &ticket,
                TicketCommand::Approve {
                    departments: resolved.clone(),
                    reason,
                },
            )
            .await?;

        let transition = StatusTransition {
            expected: TicketStatus::InComplianceReview,
            status: aggregate.status().unwrap_or(TicketStatus::InResolution),
            at: self.ctx.occurred_at(&events),
        };
        let (updated, created) = self
            .ctx
            .assignments
            .create_assignments_bulk(ticket_id, resolved, transition)
            .await?;

        self.ctx
            .audit
            .record_ticket_events(&updated, &events, actor)
            .await;

        tracing::info!(
            ticket_id = %ticket_id,
            assignments = created.len(),
            "ticket approved"
        );
        Ok(ticket_id)
    }

    /// Rejects a ticket in review; it closes without assignments.
    pub async fn reject_ticket(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Ticket, TicketError> {
        authorize(actor, Operation::RejectTicket)?;

        let ticket = self.ctx.load_ticket(ticket_id).await?;
        let (_, events) = self
            .ctx
            .decide(&ticket, TicketCommand::Reject { reason })
            .await?;

        let rejected_at = self.ctx.occurred_at(&events);
        let updated = self
            .ctx
            .tickets
            .transition_ticket_status(
                ticket_id,
                TicketStatus::InComplianceReview,
                TicketStatus::Closed,
                rejected_at,
            )
            .await?;

        self.ctx
            .audit
            .record_ticket_events(&updated, &events, actor)
            .await;

        tracing::info!(ticket_id = %ticket_id, "ticket rejected");
        Ok(updated)
    }

    /// Final closure of a ticket whose assignments are all resolved.
    ///
    /// The unresolved count is re-verified even when the stored status
    /// already reads `Ready to Close`.
    pub async fn close_ticket(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
    ) -> Result<Ticket, TicketError> {
        authorize(actor, Operation::CloseTicket)?;

        let ticket = self.ctx.load_ticket(ticket_id).await?;
        let (_, events) = self.ctx.decide(&ticket, TicketCommand::Close).await?;

        let unresolved = self
            .ctx
            .assignments
            .count_unresolved_assignments(ticket_id)
            .await?;
        if unresolved > 0 {
            tracing::warn!(
                ticket_id = %ticket_id,
                unresolved,
                "close refused: assignments still unresolved"
            );
            return Err(TicketError::invalid_state(format!(
                "{} department assignment(s) are not resolved",
                unresolved
            )));
        }

        let closed_at = self.ctx.occurred_at(&events);
        let updated = self
            .ctx
            .tickets
            .transition_ticket_status(
                ticket_id,
                TicketStatus::ReadyToClose,
                TicketStatus::Closed,
                closed_at,
            )
            .await?;

        self.ctx
            .audit
            .record_ticket_events(&updated, &events, actor)
            .await;

        tracing::info!(ticket_id = %ticket_id, "ticket closed");
        Ok(updated)
    }

    /// Tickets awaiting a compliance decision, oldest first.
    pub async fn compliance_queue(&self) -> Result<Vec<Ticket>, TicketError> {
        Ok(self
            .ctx
            .tickets
            .find_tickets_by_status(TicketStatus::InComplianceReview)
            .await?)
    }

    /// Tickets awaiting final closure with their assignment summaries,
    /// most recently updated first.
    pub async fn ready_to_close_queue(&self) -> Result<Vec<ReadyToCloseEntry>, TicketError> {
        let mut tickets = self
            .ctx
            .tickets
            .find_tickets_by_status(TicketStatus::ReadyToClose)
            .await?;
        tickets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut queue = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let assignments = self
                .ctx
                .assignments
                .find_assignments_by_ticket_id(ticket.id)
                .await?
                .iter()
                .map(|a| a.summary())
                .collect();
            queue.push(ReadyToCloseEntry {
                ticket,
                assignments,
            });
        }
        Ok(queue)
    }
}

#[cfg(test)]
#[path = "tests/triage_tests.rs"]
mod tests;
