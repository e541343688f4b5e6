use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::assignment::DepartmentRequest;
use crate::domain::types::{
    Actor, ActorRole, AssignmentId, AssignmentStatus, Priority, ReferenceId, TicketId, UserId,
};

#[derive(Parser, Debug)]
#[command(name = "ticketflow")]
#[command(about = "Support ticket lifecycle: compliance triage, department fan-out, reopen chains")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TICKETFLOW_GIT_SHA"), ")"))]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Id of the acting user
    #[arg(long, global = true)]
    pub actor: Option<UserId>,

    /// Role of the acting user (client, compliance, manager, team_lead)
    #[arg(long, global = true)]
    pub role: Option<ActorRole>,

    /// Department and branch configuration (defaults to the bundled one)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The acting identity, required by every command that changes state.
    pub fn acting_as(&self) -> anyhow::Result<Actor> {
        match (self.actor, self.role) {
            (Some(id), Some(role)) => Ok(Actor::new(id, role)),
            _ => anyhow::bail!("this command requires --actor <uuid> and --role <role>"),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Raise a new ticket (client)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },

    /// Reopen a closed ticket as a new generation (client)
    Reopen { ticket_id: TicketId },

    /// Approve a ticket into departments, e.g. `-d Resume -d Marketing:AHM` (compliance)
    Approve {
        ticket_id: TicketId,
        #[arg(short, long = "department", required = true)]
        departments: Vec<DepartmentRequest>,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Reject a ticket under review (compliance)
    Reject {
        ticket_id: TicketId,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Close a ticket whose assignments are all resolved (compliance)
    Close { ticket_id: TicketId },

    /// Give an assignment to a team lead (manager)
    AssignLead {
        assignment_id: AssignmentId,
        #[arg(long)]
        team_lead: UserId,
    },

    /// Move an assignment to in_progress, waiting_for_client or resolved (team lead)
    UpdateAssignment {
        assignment_id: AssignmentId,
        #[arg(long)]
        status: AssignmentStatus,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Tickets awaiting compliance review, oldest first
    Queue,

    /// Tickets ready for final closure, most recent first
    ReadyQueue,

    /// Every generation of a reference chain, oldest first
    History { reference_id: ReferenceId },

    /// A ticket with its department assignments
    Show { ticket_id: TicketId },

    /// A client's tickets, newest first (defaults to --actor)
    Tickets {
        #[arg(long)]
        client: Option<UserId>,
    },

    /// Assignments held by a team lead (defaults to --actor)
    Work {
        #[arg(long)]
        team_lead: Option<UserId>,
    },

    /// Audit entries, newest first
    Audit {
        #[arg(long, conflicts_with = "reference")]
        ticket: Option<TicketId>,
        #[arg(long)]
        reference: Option<ReferenceId>,
        /// Entries to show when listing recent activity
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Command {
    /// Whether the command writes to the store.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Reopen { .. }
                | Command::Approve { .. }
                | Command::Reject { .. }
                | Command::Close { .. }
                | Command::AssignLead { .. }
                | Command::UpdateAssignment { .. }
        )
    }
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
