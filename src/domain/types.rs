//! Strongly typed domain primitives for tickets, assignments and actors.
//!
//! Identifiers are UUID newtypes so a ticket id can never be passed where a
//! reference id or user id is expected. Status enums carry the human-readable
//! labels used by the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::TicketError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses an identifier from its string form.
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

uuid_id!(
    /// Store-assigned identity of a single ticket generation.
    TicketId
);

uuid_id!(
    /// Identifier shared by a ticket and every generation reopened from it.
    ReferenceId
);

uuid_id!(
    /// Identity of a department assignment.
    AssignmentId
);

uuid_id!(
    /// Identity of a user (client, compliance reviewer, manager or team lead).
    UserId
);

uuid_id!(
    /// Identity of an audit log entry.
    AuditEntryId
);

/// UTC timestamp for entities and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampUtc(pub DateTime<Utc>);

impl TimestampUtc {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the timestamp as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for TimestampUtc {
    fn default() -> Self {
        Self::now()
    }
}

/// Name of a department from the configured catalog (e.g. "Resume", "Marketing").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentName(pub String);

impl DepartmentName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DepartmentName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DepartmentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DepartmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Branch code for departments that operate per branch (e.g. "AHM").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchCode(pub String);

impl BranchCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BranchCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BranchCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BranchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Priority {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(TicketError::invalid_input(format!("unknown priority '{}'", s))),
        }
    }
}

/// Ticket status state machine.
///
/// `InComplianceReview` is initial and `Closed` is terminal. A rejected
/// ticket moves straight from review to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    InComplianceReview,
    InResolution,
    WaitingForClient,
    ReadyToClose,
    Closed,
}

impl TicketStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::InComplianceReview => "In Compliance Review",
            TicketStatus::InResolution => "In Resolution",
            TicketStatus::WaitingForClient => "Waiting for Client",
            TicketStatus::ReadyToClose => "Ready to Close",
            TicketStatus::Closed => "Closed",
        }
    }

    /// Every status other than `Closed` counts as an open generation.
    pub fn is_open(&self) -> bool {
        *self != TicketStatus::Closed
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "in_compliance_review" => Ok(TicketStatus::InComplianceReview),
            "in_resolution" => Ok(TicketStatus::InResolution),
            "waiting_for_client" => Ok(TicketStatus::WaitingForClient),
            "ready_to_close" => Ok(TicketStatus::ReadyToClose),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(TicketError::invalid_input(format!(
                "unknown ticket status '{}'",
                s
            ))),
        }
    }
}

/// Status of a single department assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    NotAssigned,
    InProgress,
    WaitingForClient,
    Resolved,
}

impl AssignmentStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentStatus::NotAssigned => "Not Assigned",
            AssignmentStatus::InProgress => "In Progress",
            AssignmentStatus::WaitingForClient => "Waiting for Client",
            AssignmentStatus::Resolved => "Resolved",
        }
    }

    /// Statuses a team lead may set. `NotAssigned` is only ever the initial value.
    pub fn is_caller_settable(&self) -> bool {
        !matches!(self, AssignmentStatus::NotAssigned)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AssignmentStatus {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "not_assigned" => Ok(AssignmentStatus::NotAssigned),
            "in_progress" => Ok(AssignmentStatus::InProgress),
            "waiting_for_client" => Ok(AssignmentStatus::WaitingForClient),
            "resolved" => Ok(AssignmentStatus::Resolved),
            _ => Err(TicketError::invalid_input(format!(
                "unknown assignment status '{}'",
                s
            ))),
        }
    }
}

/// Role of the actor driving an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Client,
    Compliance,
    Manager,
    TeamLead,
    System,
}

impl ActorRole {
    pub fn label(&self) -> &'static str {
        match self {
            ActorRole::Client => "Client",
            ActorRole::Compliance => "Compliance",
            ActorRole::Manager => "Manager",
            ActorRole::TeamLead => "Team Lead",
            ActorRole::System => "System",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ActorRole {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "client" => Ok(ActorRole::Client),
            "compliance" => Ok(ActorRole::Compliance),
            "manager" => Ok(ActorRole::Manager),
            "team_lead" | "teamlead" => Ok(ActorRole::TeamLead),
            "system" => Ok(ActorRole::System),
            _ => Err(TicketError::invalid_input(format!("unknown role '{}'", s))),
        }
    }
}

/// Authenticated caller as supplied by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: UserId, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// The same caller acting in the `System` role, used for derived transitions.
    pub fn as_system(&self) -> Self {
        Self {
            id: self.id,
            role: ActorRole::System,
        }
    }
}

/// Lowercases and folds spaces/dashes to underscores so both labels
/// ("Waiting for Client") and identifiers ("waiting_for_client") parse.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
