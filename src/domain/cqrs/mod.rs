//! CQRS core types for the ticket status state machine.
//!
//! This module contains:
//! - **Commands**: intent to move a ticket's status
//! - **Events**: status facts, also the source of audit entries
//! - **Aggregate**: command validation and event application
//!
//! Tickets live in the store as current state, so the aggregate is hydrated
//! from a stored ticket, decides, and the engines persist the outcome.

pub mod commands;
pub mod events;

pub use commands::TicketCommand;
pub use events::TicketEvent;

use crate::domain::errors::TicketError;
use crate::domain::services::TicketServices;
use crate::domain::ticket::Ticket;
use crate::domain::types::TicketStatus;
use async_trait::async_trait;
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

/// Ticket aggregate state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum TicketState {
    /// No ticket has been loaded into the aggregate.
    #[default]
    Unloaded,
    /// Aggregate wraps a stored ticket (boxed for memory efficiency).
    Loaded(Box<Ticket>),
}

/// The ticket aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TicketAggregate {
    pub state: TicketState,
}

impl TicketAggregate {
    /// Hydrates the aggregate from a stored ticket.
    pub fn from_ticket(ticket: Ticket) -> Self {
        Self {
            state: TicketState::Loaded(Box::new(ticket)),
        }
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        match &self.state {
            TicketState::Loaded(ticket) => Some(ticket),
            TicketState::Unloaded => None,
        }
    }

    pub fn status(&self) -> Option<TicketStatus> {
        self.ticket().map(|ticket| ticket.status)
    }
}

#[async_trait]
impl Aggregate for TicketAggregate {
    type Command = TicketCommand;
    type Event = TicketEvent;
    type Error = TicketError;
    type Services = TicketServices;

    fn aggregate_type() -> String {
        "ticket".to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        let now = services.clock.now();
        let status = match self.status() {
            Some(status) => status,
            None => return Err(TicketError::invalid_state("ticket aggregate not loaded")),
        };

        match (status, command) {
            // Approve emits the decision and the fan-out request
            (
                TicketStatus::InComplianceReview,
                TicketCommand::Approve {
                    departments,
                    reason,
                },
            ) => {
                let names = departments.iter().map(|d| d.department.clone()).collect();
                Ok(vec![
                    TicketEvent::TicketApproved {
                        departments,
                        reason,
                        approved_at: now,
                    },
                    TicketEvent::DepartmentsAssigned {
                        departments: names,
                        assigned_at: now,
                    },
                ])
            }

            (TicketStatus::InComplianceReview, TicketCommand::Reject { reason }) => {
                Ok(vec![TicketEvent::TicketRejected {
                    reason,
                    rejected_at: now,
                }])
            }

            // AwaitClient - idempotent when already waiting
            (TicketStatus::WaitingForClient, TicketCommand::AwaitClient) => Ok(vec![]),
            (
                TicketStatus::InResolution | TicketStatus::ReadyToClose,
                TicketCommand::AwaitClient,
            ) => Ok(vec![TicketEvent::StatusChanged {
                from: status,
                to: TicketStatus::WaitingForClient,
                changed_at: now,
            }]),

            // ResumeResolution only moves a waiting ticket
            (TicketStatus::WaitingForClient, TicketCommand::ResumeResolution) => {
                Ok(vec![TicketEvent::StatusChanged {
                    from: status,
                    to: TicketStatus::InResolution,
                    changed_at: now,
                }])
            }
            (
                TicketStatus::InResolution | TicketStatus::ReadyToClose,
                TicketCommand::ResumeResolution,
            ) => Ok(vec![]),

            // MarkReadyToClose - idempotent when already ready
            (TicketStatus::ReadyToClose, TicketCommand::MarkReadyToClose) => Ok(vec![]),
            (
                TicketStatus::InResolution | TicketStatus::WaitingForClient,
                TicketCommand::MarkReadyToClose,
            ) => Ok(vec![TicketEvent::StatusChanged {
                from: status,
                to: TicketStatus::ReadyToClose,
                changed_at: now,
            }]),

            (TicketStatus::ReadyToClose, TicketCommand::Close) => {
                Ok(vec![TicketEvent::TicketClosed { closed_at: now }])
            }

            (status, cmd) => Err(TicketError::invalid_state(rejection_message(&cmd, status))),
        }
    }

    fn apply(&mut self, event: Self::Event) {
        let TicketState::Loaded(ticket) = &mut self.state else {
            // Events only ever follow a successful handle on a loaded ticket
            return;
        };

        match event {
            TicketEvent::TicketApproved { approved_at, .. } => {
                ticket.status = TicketStatus::InResolution;
                ticket.updated_at = approved_at;
            }
            TicketEvent::DepartmentsAssigned { .. } => {}
            TicketEvent::TicketRejected { rejected_at, .. } => {
                ticket.status = TicketStatus::Closed;
                ticket.closed_at = Some(rejected_at);
                ticket.updated_at = rejected_at;
            }
            TicketEvent::StatusChanged { to, changed_at, .. } => {
                ticket.status = to;
                ticket.updated_at = changed_at;
            }
            TicketEvent::TicketClosed { closed_at } => {
                ticket.status = TicketStatus::Closed;
                ticket.closed_at = Some(closed_at);
                ticket.updated_at = closed_at;
            }
        }
    }
}

/// Explains why `cmd` cannot run while the ticket is in `status`.
fn rejection_message(cmd: &TicketCommand, status: TicketStatus) -> String {
    match cmd {
        TicketCommand::Approve { .. } | TicketCommand::Reject { .. } => {
            format!("ticket is not in compliance review (status: {})", status)
        }
        TicketCommand::Close => format!("ticket is not ready to close (status: {})", status),
        TicketCommand::AwaitClient
        | TicketCommand::ResumeResolution
        | TicketCommand::MarkReadyToClose => {
            format!("ticket is not in resolution (status: {})", status)
        }
    }
}

#[cfg(test)]
#[path = "../tests/aggregate_tests.rs"]
mod tests;
