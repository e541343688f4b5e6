//! Single authorization table mapping each mutating operation to its roles.

use serde::{Deserialize, Serialize};

use crate::domain::errors::TicketError;
use crate::domain::types::{Actor, ActorRole};

/// Operations gated by actor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateTicket,
    ReopenTicket,
    ApproveTicket,
    RejectTicket,
    CloseTicket,
    AssignTeamLead,
    UpdateAssignmentStatus,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateTicket => "create ticket",
            Operation::ReopenTicket => "reopen ticket",
            Operation::ApproveTicket => "approve ticket",
            Operation::RejectTicket => "reject ticket",
            Operation::CloseTicket => "close ticket",
            Operation::AssignTeamLead => "assign team lead",
            Operation::UpdateAssignmentStatus => "update assignment status",
        }
    }
}

const PERMISSIONS: &[(Operation, &[ActorRole])] = &[
    (Operation::CreateTicket, &[ActorRole::Client]),
    (Operation::ReopenTicket, &[ActorRole::Client]),
    (Operation::ApproveTicket, &[ActorRole::Compliance]),
    (Operation::RejectTicket, &[ActorRole::Compliance]),
    (Operation::CloseTicket, &[ActorRole::Compliance]),
    (Operation::AssignTeamLead, &[ActorRole::Manager]),
    (Operation::UpdateAssignmentStatus, &[ActorRole::TeamLead]),
];

/// Roles permitted to perform `operation`.
pub fn permitted_roles(operation: Operation) -> &'static [ActorRole] {
    PERMISSIONS
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// Fails with `Unauthorized` unless the actor's role may perform `operation`.
pub fn authorize(actor: &Actor, operation: Operation) -> Result<(), TicketError> {
    if permitted_roles(operation).contains(&actor.role) {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = %actor.id,
            role = %actor.role,
            operation = operation.name(),
            "role not permitted"
        );
        Err(TicketError::unauthorized(format!(
            "role {} may not {}",
            actor.role,
            operation.name()
        )))
    }
}

#[cfg(test)]
#[path = "tests/authorization_tests.rs"]
mod tests;
