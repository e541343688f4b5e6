use crate::audit::AuditEventType;
use crate::domain::errors::TicketError;
use crate::domain::types::{ActorRole, AssignmentId, AssignmentStatus, TicketStatus};
use crate::engine::test_support::*;

#[tokio::test]
async fn waiting_assignment_moves_ticket_to_waiting() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume", "Technical"]).await;

    h.set_assignment(assignments[0].id, AssignmentStatus::WaitingForClient)
        .await;

    assert_eq!(
        h.ticket(ticket.id).await.status,
        TicketStatus::WaitingForClient
    );
}

#[tokio::test]
async fn in_progress_resumes_waiting_ticket() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume", "Technical"]).await;
    h.set_assignment(assignments[0].id, AssignmentStatus::WaitingForClient)
        .await;

    h.set_assignment(assignments[0].id, AssignmentStatus::InProgress)
        .await;

    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::InResolution);
}

#[tokio::test]
async fn in_progress_leaves_resolving_ticket_alone() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume", "Technical"]).await;
    let before = h.audit_entries().await.len();

    h.set_assignment(assignments[1].id, AssignmentStatus::InProgress)
        .await;

    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::InResolution);
    // Only the assignment update itself is recorded
    assert_eq!(h.audit_entries().await.len(), before + 1);
}

#[tokio::test]
async fn partial_resolution_keeps_ticket_in_resolution() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume", "Technical"]).await;

    let resolved = h
        .desk
        .resolution
        .update_assignment_status(
            assignments[0].id,
            AssignmentStatus::Resolved,
            &team_lead(),
            Some("Formatting fixed".to_string()),
        )
        .await
        .unwrap();

    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.review_notes.as_deref(), Some("Formatting fixed"));
    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::InResolution);
}

#[tokio::test]
async fn resolving_every_assignment_makes_ticket_ready() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h
        .approve(ticket.id, &["Resume", "Technical", "Sales"])
        .await;

    // Resolve in reverse creation order, one waiting detour included
    h.set_assignment(assignments[1].id, AssignmentStatus::WaitingForClient)
        .await;
    for assignment in assignments.iter().rev() {
        h.set_assignment(assignment.id, AssignmentStatus::Resolved)
            .await;
    }

    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::ReadyToClose);
}

#[tokio::test]
async fn last_resolution_from_waiting_makes_ticket_ready() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume"]).await;
    h.set_assignment(assignments[0].id, AssignmentStatus::WaitingForClient)
        .await;

    h.set_assignment(assignments[0].id, AssignmentStatus::Resolved)
        .await;

    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::ReadyToClose);
}

#[tokio::test]
async fn repeated_resolution_is_idempotent() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume"]).await;
    h.set_assignment(assignments[0].id, AssignmentStatus::Resolved)
        .await;
    let status_changes_before = count_status_changes(&h).await;

    h.set_assignment(assignments[0].id, AssignmentStatus::Resolved)
        .await;

    assert_eq!(h.ticket(ticket.id).await.status, TicketStatus::ReadyToClose);
    assert_eq!(count_status_changes(&h).await, status_changes_before);
}

async fn count_status_changes(h: &Harness) -> usize {
    h.audit_types()
        .await
        .into_iter()
        .filter(|t| *t == AuditEventType::TicketStatusChanged)
        .count()
}

#[tokio::test]
async fn derived_changes_are_recorded_as_system() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume"]).await;
    let lead = team_lead();

    h.desk
        .resolution
        .update_assignment_status(assignments[0].id, AssignmentStatus::Resolved, &lead, None)
        .await
        .unwrap();

    let entries = h.audit_entries().await;
    let update = entries
        .iter()
        .find(|e| e.event_type == AuditEventType::AssignmentStatusUpdated)
        .unwrap();
    assert_eq!(update.actor_role, ActorRole::TeamLead);
    assert_eq!(update.payload["old_status"], "not_assigned");
    assert_eq!(update.payload["new_status"], "resolved");

    let change = entries.last().unwrap();
    assert_eq!(change.event_type, AuditEventType::TicketStatusChanged);
    assert_eq!(change.actor_role, ActorRole::System);
    assert_eq!(change.actor_id, lead.id);
    assert_eq!(change.payload["to"], "ready_to_close");
}

#[tokio::test]
async fn not_assigned_is_not_a_valid_target() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume"]).await;

    let err = h
        .desk
        .resolution
        .update_assignment_status(
            assignments[0].id,
            AssignmentStatus::NotAssigned,
            &team_lead(),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TicketError::InvalidInput { .. }));
}

#[tokio::test]
async fn update_requires_team_lead_role_and_existing_assignment() {
    let h = harness();

    let wrong_role = h
        .desk
        .resolution
        .update_assignment_status(
            AssignmentId::new(),
            AssignmentStatus::InProgress,
            &compliance(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(wrong_role, TicketError::Unauthorized { .. }));

    let missing = h
        .desk
        .resolution
        .update_assignment_status(
            AssignmentId::new(),
            AssignmentStatus::InProgress,
            &team_lead(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, TicketError::NotFound { .. }));
}

#[tokio::test]
async fn assigned_lead_owns_the_assignment() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Technical"]).await;
    let lead = team_lead();
    h.desk
        .resolution
        .assign_team_lead(assignments[0].id, lead.id, &manager())
        .await
        .unwrap();

    let other = h
        .desk
        .resolution
        .update_assignment_status(
            assignments[0].id,
            AssignmentStatus::InProgress,
            &team_lead(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(other, TicketError::Unauthorized { .. }));

    let own = h
        .desk
        .resolution
        .update_assignment_status(assignments[0].id, AssignmentStatus::InProgress, &lead, None)
        .await
        .unwrap();
    assert_eq!(own.status, AssignmentStatus::InProgress);
}

#[tokio::test]
async fn closed_ticket_assignments_are_read_only() {
    let h = harness();
    let closed = h.closed_ticket(&client()).await;
    let assignments = h.assignments(closed.id).await;

    let err = h
        .desk
        .resolution
        .update_assignment_status(
            assignments[0].id,
            AssignmentStatus::InProgress,
            &team_lead(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketError::InvalidState { .. }));

    let assign = h
        .desk
        .resolution
        .assign_team_lead(assignments[0].id, team_lead().id, &manager())
        .await
        .unwrap_err();
    assert!(matches!(assign, TicketError::InvalidState { .. }));

    assert_eq!(h.assignments(closed.id).await, assignments);
}

#[tokio::test]
async fn assign_team_lead_records_manager_and_lead() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Marketing:AHM"]).await;
    let boss = manager();
    let lead = team_lead();

    let updated = h
        .desk
        .resolution
        .assign_team_lead(assignments[0].id, lead.id, &boss)
        .await
        .unwrap();

    assert_eq!(updated.assigned_manager_id, Some(boss.id));
    assert_eq!(updated.assigned_team_lead_id, Some(lead.id));
    assert_eq!(updated.status, AssignmentStatus::NotAssigned);

    let entry = h.audit_entries().await.last().cloned().unwrap();
    assert_eq!(entry.event_type, AuditEventType::TeamLeadAssigned);
    assert_eq!(entry.ticket_id, Some(ticket.id));
    assert_eq!(entry.actor_role, ActorRole::Manager);

    let work = h
        .desk
        .resolution
        .team_lead_assignments(lead.id)
        .await
        .unwrap();
    assert_eq!(work, vec![updated]);
}

#[tokio::test]
async fn assign_team_lead_is_manager_only() {
    let h = harness();
    let ticket = h.create(&client()).await;
    let assignments = h.approve(ticket.id, &["Resume"]).await;

    let err = h
        .desk
        .resolution
        .assign_team_lead(assignments[0].id, team_lead().id, &compliance())
        .await
        .unwrap_err();

    assert!(matches!(err, TicketError::Unauthorized { .. }));
}
