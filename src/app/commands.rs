//! Runs one CLI command against the persisted store.
//!
//! Each invocation holds the store lock for its whole load, execute and
//! save cycle, so concurrent processes serialize on the snapshot file.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::app::cli::{Cli, Command};
use crate::audit::{AuditRecorder, JsonlAuditSink};
use crate::config::TicketflowConfig;
use crate::domain::ticket::TicketDraft;
use crate::engine::{EngineContext, TicketDesk};
use crate::store::{load_snapshot, save_snapshot, MemoryStore, StoreLock};
use crate::ticketflow_paths::{audit_log_path, store_lock_path, store_path};

/// Loads the store, executes `cli.command` and prints the result as JSON.
pub async fn run(cli: Cli) -> Result<()> {
    let config = TicketflowConfig::load_or_default(cli.config.as_deref())?;

    let lock_path = store_lock_path()?;
    let _lock = StoreLock::acquire(&lock_path)
        .with_context(|| format!("Failed to lock store: {}", lock_path.display()))?;

    let store_path = store_path()?;
    let snapshot = load_snapshot(&store_path)
        .with_context(|| format!("Failed to load store: {}", store_path.display()))?;
    let store = Arc::new(MemoryStore::from_snapshot(snapshot));
    let audit = AuditRecorder::new(Arc::new(JsonlAuditSink::new(audit_log_path()?)));
    let ctx = EngineContext::with_memory_store(store.clone(), audit, config.catalog());

    let output = execute(&cli, &ctx, config.audit.recent_limit).await?;

    if cli.command.mutates() {
        save_snapshot(&store_path, &store.snapshot().await)
            .with_context(|| format!("Failed to save store: {}", store_path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Executes `cli.command` against `ctx` and returns the printable result.
pub async fn execute(cli: &Cli, ctx: &EngineContext, recent_limit: usize) -> Result<Value> {
    let desk = TicketDesk::new(ctx.clone());

    match cli.command.clone() {
        Command::Create {
            title,
            description,
            priority,
            email,
            phone,
        } => {
            let draft = TicketDraft {
                title,
                description,
                priority,
                contact_email: email,
                contact_phone: phone,
            };
            to_json(desk.lifecycle.create_ticket(draft, &cli.acting_as()?).await?)
        }
        Command::Reopen { ticket_id } => to_json(
            desk.lifecycle
                .reopen_ticket(ticket_id, &cli.acting_as()?)
                .await?,
        ),
        Command::Approve {
            ticket_id,
            departments,
            reason,
        } => {
            let actor = cli.acting_as()?;
            desk.triage
                .approve_ticket(ticket_id, &departments, &actor, reason)
                .await?;
            to_json(desk.lifecycle.ticket_detail(ticket_id).await?)
        }
        Command::Reject { ticket_id, reason } => to_json(
            desk.triage
                .reject_ticket(ticket_id, &cli.acting_as()?, reason)
                .await?,
        ),
        Command::Close { ticket_id } => to_json(
            desk.triage
                .close_ticket(ticket_id, &cli.acting_as()?)
                .await?,
        ),
        Command::AssignLead {
            assignment_id,
            team_lead,
        } => to_json(
            desk.resolution
                .assign_team_lead(assignment_id, team_lead, &cli.acting_as()?)
                .await?,
        ),
        Command::UpdateAssignment {
            assignment_id,
            status,
            notes,
        } => to_json(
            desk.resolution
                .update_assignment_status(assignment_id, status, &cli.acting_as()?, notes)
                .await?,
        ),
        Command::Queue => to_json(desk.triage.compliance_queue().await?),
        Command::ReadyQueue => to_json(desk.triage.ready_to_close_queue().await?),
        Command::History { reference_id } => {
            to_json(desk.lifecycle.ticket_history(reference_id).await?)
        }
        Command::Show { ticket_id } => to_json(desk.lifecycle.ticket_detail(ticket_id).await?),
        Command::Tickets { client } => {
            let client_id = match client {
                Some(id) => id,
                None => cli.acting_as()?.id,
            };
            to_json(desk.lifecycle.client_tickets(client_id).await?)
        }
        Command::Work { team_lead } => {
            let team_lead_id = match team_lead {
                Some(id) => id,
                None => cli.acting_as()?.id,
            };
            to_json(desk.resolution.team_lead_assignments(team_lead_id).await?)
        }
        Command::Audit {
            ticket,
            reference,
            limit,
        } => {
            let entries = match (ticket, reference) {
                (Some(ticket_id), _) => ctx.audit.by_ticket(ticket_id).await?,
                (None, Some(reference_id)) => ctx.audit.by_reference(reference_id).await?,
                (None, None) => ctx.audit.recent(limit.unwrap_or(recent_limit)).await?,
            };
            to_json(entries)
        }
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
