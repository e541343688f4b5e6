//! Support ticket lifecycle core.
//!
//! Clients raise tickets, a compliance gate approves them into one or more
//! departments, team leads resolve their assignments, and compliance closes
//! the ticket once every assignment is resolved. A closed ticket can be
//! reopened as a new generation sharing its reference id.

pub mod app;
pub mod audit;
pub mod config;
pub mod domain;
pub mod engine;
pub mod store;
pub mod ticketflow_paths;
