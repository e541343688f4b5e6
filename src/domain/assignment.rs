//! Department assignments: the per-department work spawned from an approved ticket.

use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AssignmentId, AssignmentStatus, BranchCode, DepartmentName, TicketId, TimestampUtc, UserId,
};

/// Unit of department work owned by exactly one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentAssignment {
    pub id: AssignmentId,
    pub ticket_id: TicketId,
    pub department: DepartmentName,
    pub branch: Option<BranchCode>,
    pub assigned_manager_id: Option<UserId>,
    pub assigned_team_lead_id: Option<UserId>,
    pub status: AssignmentStatus,
    pub review_notes: Option<String>,
    pub resolved_at: Option<TimestampUtc>,
    pub created_at: TimestampUtc,
    pub updated_at: TimestampUtc,
}

impl DepartmentAssignment {
    pub fn is_resolved(&self) -> bool {
        self.status == AssignmentStatus::Resolved
    }

    /// Moves the assignment to `status` and returns the previous status.
    ///
    /// Resolving stamps `resolved_at` and keeps any supplied review notes.
    pub fn set_status(
        &mut self,
        status: AssignmentStatus,
        review_notes: Option<String>,
        now: TimestampUtc,
    ) -> AssignmentStatus {
        let old = self.status;
        self.status = status;
        if status == AssignmentStatus::Resolved {
            self.resolved_at = Some(now);
            if let Some(notes) = review_notes.filter(|n| !n.trim().is_empty()) {
                self.review_notes = Some(notes);
            }
        }
        old
    }

    /// Records who manages and who works the assignment.
    pub fn assign_team_lead(&mut self, manager_id: UserId, team_lead_id: UserId) {
        self.assigned_manager_id = Some(manager_id);
        self.assigned_team_lead_id = Some(team_lead_id);
    }

    pub fn summary(&self) -> AssignmentSummary {
        AssignmentSummary {
            assignment_id: self.id,
            department: self.department.clone(),
            branch: self.branch.clone(),
            team_lead_id: self.assigned_team_lead_id,
            status: self.status,
            review_notes: self.review_notes.clone(),
            resolved_at: self.resolved_at,
        }
    }
}

/// A department requested by the compliance reviewer at approval time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRequest {
    pub name: DepartmentName,
    #[serde(default)]
    pub branch: Option<BranchCode>,
}

impl DepartmentRequest {
    pub fn new(name: impl Into<DepartmentName>) -> Self {
        Self {
            name: name.into(),
            branch: None,
        }
    }

    pub fn with_branch(name: impl Into<DepartmentName>, branch: impl Into<BranchCode>) -> Self {
        Self {
            name: name.into(),
            branch: Some(branch.into()),
        }
    }
}

impl std::str::FromStr for DepartmentRequest {
    type Err = std::convert::Infallible;

    /// Parses `Name` or `Name:BRANCH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once(':') {
            Some((name, branch)) => Self::with_branch(name.trim(), branch.trim()),
            None => Self::new(s.trim()),
        })
    }
}

/// An assignment ready to be inserted; always starts `NotAssigned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub department: DepartmentName,
    pub branch: Option<BranchCode>,
}

/// Reviewer-facing projection of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assignment_id: AssignmentId,
    pub department: DepartmentName,
    pub branch: Option<BranchCode>,
    pub team_lead_id: Option<UserId>,
    pub status: AssignmentStatus,
    pub review_notes: Option<String>,
    pub resolved_at: Option<TimestampUtc>,
}
