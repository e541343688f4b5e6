use super::*;
use crate::domain::assignment::NewAssignment;
use crate::domain::types::{Priority, TicketStatus};

/// Sink that refuses every write, standing in for an unreachable audit store.
struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn append(&self, _entry: AuditLogEntry) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }

    async fn by_ticket(&self, _ticket_id: TicketId) -> Result<Vec<AuditLogEntry>, AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }

    async fn by_reference(
        &self,
        _reference_id: ReferenceId,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<AuditLogEntry>, AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }
}

fn ticket() -> Ticket {
    let now = TimestampUtc::now();
    Ticket {
        id: TicketId::new(),
        reference_id: ReferenceId::new(),
        parent_ticket_id: None,
        client_id: UserId::new(),
        title: "Cover letter".to_string(),
        description: "Needs a rewrite".to_string(),
        priority: Priority::Low,
        status: TicketStatus::InComplianceReview,
        reopen_count: 0,
        warning_flag: false,
        contact_email: "client@example.com".to_string(),
        contact_phone: "555-0103".to_string(),
        closed_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn compliance() -> Actor {
    Actor::new(UserId::new(), ActorRole::Compliance)
}

#[test]
fn event_types_serialize_screaming_snake_case() {
    let json = serde_json::to_string(&AuditEventType::SisterTicketCreated).unwrap();
    assert_eq!(json, "\"SISTER_TICKET_CREATED\"");
    assert_eq!(
        AuditEventType::TicketStatusChanged.to_string(),
        "TICKET_STATUS_CHANGED"
    );
}

#[tokio::test]
async fn record_stamps_actor_and_ids() {
    let sink = Arc::new(MemoryAuditSink::new());
    let recorder = AuditRecorder::new(sink.clone());
    let ticket = ticket();
    let actor = compliance();

    let entry = recorder
        .record(NewAuditEntry::for_ticket(
            AuditEventType::TicketCreated,
            &ticket,
            &actor,
        ))
        .await
        .unwrap();

    assert_eq!(entry.ticket_id, Some(ticket.id));
    assert_eq!(entry.reference_id, Some(ticket.reference_id));
    assert_eq!(entry.actor_id, actor.id);
    assert_eq!(entry.actor_role, ActorRole::Compliance);
    assert_eq!(sink.entries().await, vec![entry]);
}

#[tokio::test]
async fn failed_write_is_swallowed() {
    let recorder = AuditRecorder::new(Arc::new(FailingSink));
    let ticket = ticket();

    let recorded = recorder
        .record(NewAuditEntry::for_ticket(
            AuditEventType::TicketClosed,
            &ticket,
            &compliance(),
        ))
        .await;

    assert!(recorded.is_none());
}

#[tokio::test]
async fn approval_event_carries_departments_and_reason() {
    let ticket = ticket();
    let event = TicketEvent::TicketApproved {
        departments: vec![NewAssignment {
            department: "Resume".into(),
            branch: None,
        }],
        reason: Some("complete request".to_string()),
        approved_at: TimestampUtc::now(),
    };

    let entry = NewAuditEntry::from_ticket_event(&ticket, &event, &compliance());

    assert_eq!(entry.event_type, AuditEventType::TicketApproved);
    assert_eq!(entry.decision_reason.as_deref(), Some("complete request"));
    assert_eq!(entry.payload["departments"][0]["department"], "Resume");
}

#[tokio::test]
async fn status_change_payload_names_both_ends() {
    let ticket = ticket();
    let event = TicketEvent::StatusChanged {
        from: TicketStatus::InResolution,
        to: TicketStatus::WaitingForClient,
        changed_at: TimestampUtc::now(),
    };

    let entry = NewAuditEntry::from_ticket_event(&ticket, &event, &compliance().as_system());

    assert_eq!(entry.event_type, AuditEventType::TicketStatusChanged);
    assert_eq!(entry.actor.role, ActorRole::System);
    assert_eq!(entry.payload["from"], "in_resolution");
    assert_eq!(entry.payload["to"], "waiting_for_client");
}

#[tokio::test]
async fn reads_are_newest_first() {
    let recorder = AuditRecorder::new(Arc::new(MemoryAuditSink::new()));
    let first = ticket();
    let mut sister = ticket();
    sister.reference_id = first.reference_id;
    let actor = compliance();

    recorder
        .record(NewAuditEntry::for_ticket(AuditEventType::TicketCreated, &first, &actor))
        .await;
    recorder
        .record(NewAuditEntry::for_ticket(
            AuditEventType::SisterTicketCreated,
            &sister,
            &actor,
        ))
        .await;

    let chain = recorder.by_reference(first.reference_id).await.unwrap();
    let types: Vec<AuditEventType> = chain.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![AuditEventType::SisterTicketCreated, AuditEventType::TicketCreated]
    );

    assert_eq!(recorder.by_ticket(first.id).await.unwrap().len(), 1);
    assert_eq!(recorder.recent(1).await.unwrap()[0].ticket_id, Some(sister.id));
}
