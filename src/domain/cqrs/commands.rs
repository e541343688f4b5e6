//! Ticket commands for the status state machine.
//!
//! Commands represent intent to change a ticket's status. The aggregate
//! validates them against the current status and produces events.

use crate::domain::assignment::NewAssignment;
use serde::{Deserialize, Serialize};

/// Commands that can be executed against the ticket aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCommand {
    /// Compliance accepts the ticket and fans it out to departments.
    Approve {
        departments: Vec<NewAssignment>,
        reason: Option<String>,
    },

    /// Compliance turns the ticket down; it closes without assignments.
    Reject { reason: Option<String> },

    /// An assignment is waiting on the client.
    AwaitClient,

    /// Work resumed after waiting on the client.
    ResumeResolution,

    /// Every assignment is resolved (idempotent when already ready).
    MarkReadyToClose,

    /// Final closure by compliance.
    Close,
}
