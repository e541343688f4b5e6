//! Error types for the ticketing domain.

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by the lifecycle, triage and resolution engines.
///
/// Every variant except `Store` is an expected, caller-recoverable condition.
/// `Store` carries collaborator faults through unchanged.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Entity id does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Actor does not own, or may not act on, the entity.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Operation is not valid for the entity's current status.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Operation would violate an at-most-one invariant.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Malformed or disallowed input value.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Store collaborator failure.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
}

impl TicketError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Short machine-readable category name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidState { .. } => "invalid_state",
            Self::Conflict { .. } => "conflict",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Store(_) => "store",
        }
    }
}

/// Store guard violations become domain conflicts; everything else propagates as a fault.
impl From<StoreError> for TicketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingTicket(id) => Self::not_found("ticket", id),
            StoreError::MissingAssignment(id) => Self::not_found("assignment", id),
            StoreError::DuplicateAssignments(ticket_id) => Self::conflict(format!(
                "departments already assigned for ticket {}",
                ticket_id
            )),
            StoreError::OpenGenerationExists(_) => {
                Self::conflict("an open ticket already exists in this reference group")
            }
            StoreError::StatusMismatch {
                ticket_id,
                expected,
                actual,
            } => Self::invalid_state(format!(
                "ticket {} is {}, expected {}",
                ticket_id, actual, expected
            )),
            other => Self::Store(other),
        }
    }
}
