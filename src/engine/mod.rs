//! Engines driving tickets through their lifecycle.
//!
//! - [`LifecycleEngine`]: creation and the reopen protocol
//! - [`TriageEngine`]: compliance approval, rejection and final closure
//! - [`ResolutionAggregator`]: assignment updates and the fan-in back to the ticket
//!
//! All three share an [`EngineContext`]. [`TicketDesk`] bundles them for callers
//! that want the whole surface.

pub mod lifecycle;
pub mod resolution;
pub mod triage;

pub use lifecycle::LifecycleEngine;
pub use resolution::ResolutionAggregator;
pub use triage::TriageEngine;

use cqrs_es::Aggregate;
use std::fmt;
use std::sync::Arc;

use crate::audit::{AuditRecorder, MemoryAuditSink};
use crate::domain::assignment::DepartmentAssignment;
use crate::domain::catalog::DepartmentCatalog;
use crate::domain::cqrs::{TicketAggregate, TicketCommand, TicketEvent};
use crate::domain::errors::TicketError;
use crate::domain::services::{TicketClock, TicketServices};
use crate::domain::ticket::Ticket;
use crate::domain::types::{AssignmentId, TicketId, TimestampUtc};
use crate::store::{AssignmentStore, MemoryStore, TicketStore};

/// Collaborators shared by every engine.
#[derive(Clone)]
pub struct EngineContext {
    pub tickets: Arc<dyn TicketStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub audit: AuditRecorder,
    pub catalog: Arc<DepartmentCatalog>,
    pub services: TicketServices,
}

impl EngineContext {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        assignments: Arc<dyn AssignmentStore>,
        audit: AuditRecorder,
        catalog: DepartmentCatalog,
    ) -> Self {
        Self {
            tickets,
            assignments,
            audit,
            catalog: Arc::new(catalog),
            services: TicketServices::default(),
        }
    }

    /// Context over one memory store serving both store roles.
    pub fn with_memory_store(
        store: Arc<MemoryStore>,
        audit: AuditRecorder,
        catalog: DepartmentCatalog,
    ) -> Self {
        Self::new(store.clone(), store, audit, catalog)
    }

    /// Fresh in-memory context with an in-memory audit log.
    pub fn in_memory(catalog: DepartmentCatalog) -> Self {
        let audit = AuditRecorder::new(Arc::new(MemoryAuditSink::new()));
        Self::with_memory_store(Arc::new(MemoryStore::new()), audit, catalog)
    }

    /// Pins every timestamp the engines, store writes and audit entries use.
    pub fn with_clock(mut self, clock: TicketClock) -> Self {
        self.services = TicketServices::with_clock(clock);
        self.audit = self.audit.with_clock(clock);
        self
    }

    pub(crate) fn now(&self) -> TimestampUtc {
        self.services.clock.now()
    }

    pub(crate) async fn load_ticket(&self, id: TicketId) -> Result<Ticket, TicketError> {
        self.tickets
            .find_ticket_by_id(id)
            .await?
            .ok_or_else(|| TicketError::not_found("ticket", id))
    }

    pub(crate) async fn load_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<DepartmentAssignment, TicketError> {
        self.assignments
            .find_assignment_by_id(id)
            .await?
            .ok_or_else(|| TicketError::not_found("assignment", id))
    }

    /// Runs `command` against the ticket's state machine and applies the result.
    ///
    /// Returns the aggregate after the events and the events themselves;
    /// persisting the new status is the caller's job.
    pub(crate) async fn decide(
        &self,
        ticket: &Ticket,
        command: TicketCommand,
    ) -> Result<(TicketAggregate, Vec<TicketEvent>), TicketError> {
        let mut aggregate = TicketAggregate::from_ticket(ticket.clone());
        let events = aggregate.handle(command, &self.services).await?;
        for event in events.iter().cloned() {
            aggregate.apply(event);
        }
        Ok((aggregate, events))
    }

    /// Timestamp of the first event, or now when there were none.
    pub(crate) fn occurred_at(&self, events: &[TicketEvent]) -> TimestampUtc {
        events
            .first()
            .map(TicketEvent::occurred_at)
            .unwrap_or_else(|| self.now())
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

/// Every engine over one shared context.
#[derive(Clone, Debug)]
pub struct TicketDesk {
    pub lifecycle: LifecycleEngine,
    pub triage: TriageEngine,
    pub resolution: ResolutionAggregator,
}

impl TicketDesk {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            lifecycle: LifecycleEngine::new(ctx.clone()),
            triage: TriageEngine::new(ctx.clone()),
            resolution: ResolutionAggregator::new(ctx),
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/scenario_tests.rs"]
mod scenario_tests;

#[cfg(test)]
#[path = "tests/property_tests.rs"]
mod property_tests;
