//! Domain model for the ticketing core.
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): identifiers, statuses, roles
//! - **Entities** (`ticket.rs`, `assignment.rs`): stored records and insert shapes
//! - **Catalog** (`catalog.rs`): configured departments and branches
//! - **Authorization** (`authorization.rs`): operation to permitted-role table
//! - **CQRS** (`cqrs/`): the ticket status aggregate, its commands and events
//!
//! # Usage
//!
//! ```ignore
//! use crate::domain::{TicketAggregate, TicketCommand};
//!
//! let aggregate = TicketAggregate::from_ticket(ticket);
//! let events = aggregate.handle(TicketCommand::Close, &services).await?;
//! ```

pub mod assignment;
pub mod authorization;
pub mod catalog;
pub mod cqrs;
pub mod errors;
pub mod services;
pub mod ticket;
pub mod types;

// Re-export CQRS types
pub use cqrs::*;

// Re-export commonly used types for convenience
pub use assignment::{
    AssignmentSummary, DepartmentAssignment, DepartmentRequest, NewAssignment,
};
pub use authorization::{authorize, Operation};
pub use catalog::{DepartmentCatalog, DepartmentRule};
pub use errors::TicketError;
pub use services::{TicketClock, TicketServices};
pub use ticket::{NewTicket, ReadyToCloseEntry, Ticket, TicketDetail, TicketDraft};
pub use types::{
    Actor, ActorRole, AssignmentId, AssignmentStatus, AuditEntryId, BranchCode, DepartmentName,
    Priority, ReferenceId, TicketId, TicketStatus, TimestampUtc, UserId,
};
