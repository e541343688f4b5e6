//! Department catalog: which departments exist and which operate per branch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::assignment::{DepartmentRequest, NewAssignment};
use crate::domain::errors::TicketError;
use crate::domain::types::{BranchCode, DepartmentName};

/// Catalog entry for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRule {
    pub name: DepartmentName,
    /// Assignments to this department carry a branch code.
    #[serde(default)]
    pub requires_branch: bool,
}

/// Departments and branches consulted by the triage engine at approval time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartmentCatalog {
    rules: Vec<DepartmentRule>,
    branches: Vec<BranchCode>,
}

impl DepartmentCatalog {
    pub fn new(rules: Vec<DepartmentRule>, branches: Vec<BranchCode>) -> Self {
        Self { rules, branches }
    }

    pub fn rules(&self) -> &[DepartmentRule] {
        &self.rules
    }

    pub fn branches(&self) -> &[BranchCode] {
        &self.branches
    }

    pub fn rule(&self, name: &DepartmentName) -> Option<&DepartmentRule> {
        self.rules.iter().find(|rule| rule.name == *name)
    }

    /// Turns the reviewer's department list into assignments to insert.
    ///
    /// Branches are kept only for branch-scoped departments and dropped for
    /// the rest. The list must be non-empty, name catalog departments only,
    /// and not repeat a department/branch pair.
    pub fn resolve(&self, requests: &[DepartmentRequest]) -> Result<Vec<NewAssignment>, TicketError> {
        if requests.is_empty() {
            return Err(TicketError::invalid_input(
                "at least one department is required",
            ));
        }

        let mut seen = HashSet::new();
        let mut assignments = Vec::with_capacity(requests.len());

        for request in requests {
            let rule = self.rule(&request.name).ok_or_else(|| {
                TicketError::invalid_input(format!("unknown department '{}'", request.name))
            })?;

            let branch = if rule.requires_branch {
                match &request.branch {
                    Some(branch) if self.branches.contains(branch) => Some(branch.clone()),
                    Some(branch) => {
                        return Err(TicketError::invalid_input(format!(
                            "unknown branch '{}' for department '{}'",
                            branch, rule.name
                        )))
                    }
                    None => {
                        return Err(TicketError::invalid_input(format!(
                            "department '{}' requires a branch",
                            rule.name
                        )))
                    }
                }
            } else {
                None
            };

            if !seen.insert((rule.name.clone(), branch.clone())) {
                return Err(TicketError::invalid_input(format!(
                    "department '{}' requested more than once",
                    rule.name
                )));
            }

            assignments.push(NewAssignment {
                department: rule.name.clone(),
                branch,
            });
        }

        Ok(assignments)
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
