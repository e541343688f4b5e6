//! Ticket creation and the reopen protocol.
//!
//! A reopened ticket is a new generation in the same reference chain, never
//! a mutation of the closed one. The store refuses a generation while another
//! in the chain is still open.

use serde_json::json;

use super::EngineContext;
use crate::audit::{AuditEventType, NewAuditEntry};
use crate::domain::authorization::{authorize, Operation};
use crate::domain::errors::TicketError;
use crate::domain::ticket::{NewTicket, Ticket, TicketDetail, TicketDraft};
use crate::domain::types::{Actor, ReferenceId, TicketId, TicketStatus, UserId};

#[derive(Clone, Debug)]
pub struct LifecycleEngine {
    ctx: EngineContext,
}

impl LifecycleEngine {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Raises a new ticket owned by the calling client.
    pub async fn create_ticket(
        &self,
        draft: TicketDraft,
        actor: &Actor,
    ) -> Result<Ticket, TicketError> {
        authorize(actor, Operation::CreateTicket)?;

        let ticket = self
            .ctx
            .tickets
            .create_ticket(NewTicket::original(draft, actor.id), self.ctx.now())
            .await?;

        self.ctx
            .audit
            .record(
                NewAuditEntry::for_ticket(AuditEventType::TicketCreated, &ticket, actor).payload(
                    json!({
                        "title": ticket.title,
                        "priority": ticket.priority,
                        "status": ticket.status,
                    }),
                ),
            )
            .await;

        tracing::info!(
            ticket_id = %ticket.id,
            reference_id = %ticket.reference_id,
            client_id = %ticket.client_id,
            "ticket created"
        );
        Ok(ticket)
    }

    /// Opens the next generation of a closed ticket's chain.
    ///
    /// Fails with `NotFound`, `Unauthorized` (not the owner), `InvalidState`
    /// (ticket not closed) or `Conflict` (another generation is open), in
    /// that order.
    pub async fn reopen_ticket(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
    ) -> Result<Ticket, TicketError> {
        authorize(actor, Operation::ReopenTicket)?;

        let source = self.ctx.load_ticket(ticket_id).await?;

        if !source.is_owned_by(&actor.id) {
            tracing::warn!(
                ticket_id = %ticket_id,
                actor_id = %actor.id,
                "reopen refused: not the ticket owner"
            );
            return Err(TicketError::unauthorized(
                "only the ticket owner can reopen it",
            ));
        }

        if source.status != TicketStatus::Closed {
            return Err(TicketError::invalid_state(format!(
                "only closed tickets can be reopened (status: {})",
                source.status
            )));
        }

        let chain = self
            .ctx
            .tickets
            .find_tickets_by_reference_id(source.reference_id)
            .await?;
        if let Some(open) = chain.iter().find(|t| t.is_open()) {
            tracing::debug!(
                reference_id = %source.reference_id,
                open_ticket_id = %open.id,
                "reopen refused: chain has an open generation"
            );
            return Err(TicketError::conflict(
                "an open ticket already exists in this reference group",
            ));
        }

        let chain_len = self
            .ctx
            .tickets
            .count_tickets_by_reference_id(source.reference_id)
            .await?;

        // The store re-checks the open-generation guard under its own lock
        let sister = self
            .ctx
            .tickets
            .create_ticket(NewTicket::sister_of(&source, chain_len), self.ctx.now())
            .await?;

        self.record_reopen(&source, &sister, actor).await;

        tracing::info!(
            ticket_id = %sister.id,
            parent_ticket_id = %source.id,
            reference_id = %sister.reference_id,
            reopen_count = sister.reopen_count,
            "ticket reopened"
        );
        Ok(sister)
    }

    async fn record_reopen(&self, source: &Ticket, sister: &Ticket, actor: &Actor) {
        let audit = &self.ctx.audit;

        audit
            .record(
                NewAuditEntry::for_ticket(AuditEventType::TicketReopenRequested, source, actor)
                    .payload(json!({ "original_ticket_id": source.id })),
            )
            .await;

        audit
            .record(
                NewAuditEntry::for_ticket(AuditEventType::SisterTicketCreated, sister, actor)
                    .payload(json!({
                        "new_ticket_id": sister.id,
                        "parent_ticket_id": source.id,
                        "reopen_count": sister.reopen_count,
                    })),
            )
            .await;

        if sister.warning_flag && !source.warning_flag {
            audit
                .record(
                    NewAuditEntry::for_ticket(
                        AuditEventType::WarningFlagSet,
                        sister,
                        &actor.as_system(),
                    )
                    .payload(json!({
                        "reopen_count": sister.reopen_count,
                        "warning_flag": true,
                    })),
                )
                .await;
        }
    }

    /// Every generation of a reference chain, oldest first.
    pub async fn ticket_history(
        &self,
        reference_id: ReferenceId,
    ) -> Result<Vec<Ticket>, TicketError> {
        Ok(self
            .ctx
            .tickets
            .find_tickets_by_reference_id(reference_id)
            .await?)
    }

    /// Tickets raised by a client, newest first.
    pub async fn client_tickets(&self, client_id: UserId) -> Result<Vec<Ticket>, TicketError> {
        Ok(self.ctx.tickets.find_tickets_by_client(client_id).await?)
    }

    pub async fn ticket_detail(&self, ticket_id: TicketId) -> Result<TicketDetail, TicketError> {
        let ticket = self.ctx.load_ticket(ticket_id).await?;
        let assignments = self
            .ctx
            .assignments
            .find_assignments_by_ticket_id(ticket_id)
            .await?;
        Ok(TicketDetail {
            ticket,
            assignments,
        })
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
