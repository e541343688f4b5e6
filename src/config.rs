use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::domain::catalog::{DepartmentCatalog, DepartmentRule};
use crate::domain::types::BranchCode;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TicketflowConfig {
    pub departments: Vec<DepartmentRule>,
    #[serde(default)]
    pub branches: Vec<BranchCode>,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuditConfig {
    /// Default number of entries for the recent-activity read.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> usize {
    50
}

impl TicketflowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        const DEFAULT_TICKETFLOW_YAML: &str = include_str!("../ticketflow.yaml");

        serde_yaml::from_str(DEFAULT_TICKETFLOW_YAML)
            .expect("Failed to parse embedded ticketflow.yaml - this is a bug in the ticketflow.yaml file")
    }

    /// Loads `path` when given, otherwise the embedded defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default_config()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.departments.is_empty() {
            anyhow::bail!("At least one department must be configured");
        }

        let mut names = HashSet::new();
        for rule in &self.departments {
            if rule.name.as_str().trim().is_empty() {
                anyhow::bail!("Department names must not be empty");
            }
            if !names.insert(rule.name.as_str()) {
                anyhow::bail!("Department '{}' is configured more than once", rule.name);
            }
        }

        let needs_branches = self.departments.iter().any(|rule| rule.requires_branch);
        if needs_branches && self.branches.is_empty() {
            anyhow::bail!("Branch-scoped departments are configured but no branches are listed");
        }

        let mut branches = HashSet::new();
        for branch in &self.branches {
            if !branches.insert(branch.as_str()) {
                anyhow::bail!("Branch '{}' is configured more than once", branch);
            }
        }

        if self.audit.recent_limit == 0 {
            anyhow::bail!("audit.recent_limit must be at least 1");
        }

        Ok(())
    }

    /// Department catalog used by the triage engine.
    pub fn catalog(&self) -> DepartmentCatalog {
        DepartmentCatalog::new(self.departments.clone(), self.branches.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
