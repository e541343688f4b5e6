use super::*;
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("ticketflow").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_approve_collects_departments_with_branches() {
    let ticket = TicketId::new();
    let cli = parse(&[
        "approve",
        &ticket.to_string(),
        "-d",
        "Resume",
        "--department",
        "Marketing:AHM",
        "--reason",
        "looks fine",
    ]);

    match cli.command {
        Command::Approve {
            ticket_id,
            departments,
            reason,
        } => {
            assert_eq!(ticket_id, ticket);
            assert_eq!(
                departments,
                vec![
                    DepartmentRequest::new("Resume"),
                    DepartmentRequest::with_branch("Marketing", "AHM"),
                ]
            );
            assert_eq!(reason.as_deref(), Some("looks fine"));
        }
        other => panic!("parsed {:?}", other),
    }
}

#[test]
fn test_approve_requires_a_department() {
    let ticket = TicketId::new().to_string();
    let result = Cli::try_parse_from(["ticketflow", "approve", ticket.as_str()]);
    assert!(result.is_err());
}

#[test]
fn test_identity_flags_are_global() {
    let actor = UserId::new();
    let cli = parse(&["queue", "--actor", &actor.to_string(), "--role", "team-lead"]);

    let acting = cli.acting_as().unwrap();
    assert_eq!(acting.id, actor);
    assert_eq!(acting.role, ActorRole::TeamLead);
}

#[test]
fn test_missing_identity_is_an_error() {
    let cli = parse(&["--role", "client", "queue"]);
    assert!(cli.acting_as().is_err());
}

#[test]
fn test_unknown_role_and_status_are_rejected() {
    let assignment = AssignmentId::new().to_string();
    assert!(Cli::try_parse_from(["ticketflow", "--role", "admin", "queue"]).is_err());
    assert!(Cli::try_parse_from([
        "ticketflow",
        "update-assignment",
        assignment.as_str(),
        "--status",
        "done",
    ])
    .is_err());
}

#[test]
fn test_update_assignment_parses_status_labels() {
    let assignment = AssignmentId::new();
    let cli = parse(&[
        "update-assignment",
        &assignment.to_string(),
        "--status",
        "Waiting for Client",
    ]);

    match cli.command {
        Command::UpdateAssignment { status, .. } => {
            assert_eq!(status, AssignmentStatus::WaitingForClient)
        }
        other => panic!("parsed {:?}", other),
    }
}

#[test]
fn test_create_defaults_priority() {
    let cli = parse(&[
        "create",
        "--title",
        "CV",
        "--description",
        "Needs work",
        "--email",
        "a@b.c",
        "--phone",
        "1",
    ]);

    match &cli.command {
        Command::Create { priority, .. } => assert_eq!(*priority, Priority::Medium),
        other => panic!("parsed {:?}", other),
    }
    assert!(cli.command.mutates());
}

#[test]
fn test_reads_do_not_mutate() {
    let ticket = TicketId::new().to_string();
    for args in [
        vec!["queue"],
        vec!["ready-queue"],
        vec!["show", ticket.as_str()],
        vec!["audit", "--limit", "5"],
    ] {
        assert!(!parse(&args).command.mutates(), "{:?}", args);
    }
}

#[test]
fn test_audit_filters_conflict() {
    let ticket = TicketId::new().to_string();
    let reference = ReferenceId::new().to_string();
    let result = Cli::try_parse_from([
        "ticketflow",
        "audit",
        "--ticket",
        ticket.as_str(),
        "--reference",
        reference.as_str(),
    ]);
    assert!(result.is_err());
}
