//! Home-based storage paths for ticketflow persistence.
//!
//! Everything lives under `~/.ticketflow/` unless `TICKETFLOW_HOME` points
//! elsewhere:
//! - `store.json` - Ticket and assignment snapshot
//! - `store.lock` - Advisory lock serializing snapshot writers
//! - `audit.jsonl` - Append-only audit log

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the ticketflow directory.
const TICKETFLOW_DIR: &str = ".ticketflow";

/// Environment variable overriding the home directory.
pub const TICKETFLOW_HOME_ENV: &str = "TICKETFLOW_HOME";

/// Returns the ticketflow home directory: `$TICKETFLOW_HOME` or `~/.ticketflow/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn ticketflow_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(TICKETFLOW_HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .context("Could not determine home directory for ticket storage")?
            .join(TICKETFLOW_DIR),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create ticketflow directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the store snapshot path: `<home>/store.json`
pub fn store_path() -> Result<PathBuf> {
    Ok(ticketflow_home_dir()?.join("store.json"))
}

/// Returns the store lock path: `<home>/store.lock`
pub fn store_lock_path() -> Result<PathBuf> {
    Ok(ticketflow_home_dir()?.join("store.lock"))
}

/// Returns the audit log path: `<home>/audit.jsonl`
pub fn audit_log_path() -> Result<PathBuf> {
    Ok(ticketflow_home_dir()?.join("audit.jsonl"))
}

#[cfg(test)]
#[path = "ticketflow_paths_tests.rs"]
mod tests;
