//! Time source shared by the aggregate, the store writes and the audit trail.

use crate::domain::types::TimestampUtc;

/// Collaborators handed to the ticket aggregate.
#[derive(Debug, Clone, Default)]
pub struct TicketServices {
    pub clock: TicketClock,
}

impl TicketServices {
    pub fn with_clock(clock: TicketClock) -> Self {
        Self { clock }
    }
}

/// Wall clock, or a pinned instant for reproducible runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketClock {
    #[default]
    System,
    Fixed(TimestampUtc),
}

impl TicketClock {
    pub fn now(&self) -> TimestampUtc {
        match self {
            TicketClock::System => TimestampUtc::now(),
            TicketClock::Fixed(at) => *at,
        }
    }
}
