use super::*;

#[test]
fn statuses_parse_from_labels_and_identifiers() {
    assert_eq!(
        "Waiting for Client".parse::<TicketStatus>().unwrap(),
        TicketStatus::WaitingForClient
    );
    assert_eq!(
        "ready_to_close".parse::<TicketStatus>().unwrap(),
        TicketStatus::ReadyToClose
    );
    assert_eq!(
        "in-progress".parse::<AssignmentStatus>().unwrap(),
        AssignmentStatus::InProgress
    );
    assert_eq!("Team Lead".parse::<ActorRole>().unwrap(), ActorRole::TeamLead);
    assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
}

#[test]
fn unknown_values_are_invalid_input() {
    let err = "escalated".parse::<TicketStatus>().unwrap_err();
    assert!(matches!(err, TicketError::InvalidInput { .. }));
    assert!("owner".parse::<ActorRole>().is_err());
}

#[test]
fn only_closed_is_terminal() {
    assert!(TicketStatus::InComplianceReview.is_open());
    assert!(TicketStatus::ReadyToClose.is_open());
    assert!(!TicketStatus::Closed.is_open());
}

#[test]
fn not_assigned_is_not_caller_settable() {
    assert!(!AssignmentStatus::NotAssigned.is_caller_settable());
    assert!(AssignmentStatus::InProgress.is_caller_settable());
    assert!(AssignmentStatus::WaitingForClient.is_caller_settable());
    assert!(AssignmentStatus::Resolved.is_caller_settable());
}

#[test]
fn labels_match_display() {
    assert_eq!(TicketStatus::ReadyToClose.to_string(), "Ready to Close");
    assert_eq!(AssignmentStatus::NotAssigned.to_string(), "Not Assigned");
    assert_eq!(ActorRole::TeamLead.to_string(), "Team Lead");
}

#[test]
fn ids_round_trip_through_strings() {
    let id = TicketId::new();
    assert_eq!(id.to_string().parse::<TicketId>().unwrap(), id);
    assert!(ReferenceId::from_string("not-a-uuid").is_err());
}

#[test]
fn ids_serialize_transparently() {
    let id = UserId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id));
}

#[test]
fn system_actor_keeps_identity() {
    let actor = Actor::new(UserId::new(), ActorRole::TeamLead);
    let system = actor.as_system();
    assert_eq!(system.id, actor.id);
    assert_eq!(system.role, ActorRole::System);
}
