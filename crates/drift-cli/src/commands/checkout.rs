//! Checkout command implementation

use std::sync::Arc;

use colored::Colorize;

use drift_core::{Settings, SystemRunner, Vcs};

use super::RunStatus;
use crate::error::{CliError, Result};

/// Run the checkout command
pub fn run_checkout(settings: &Settings, branch: &str, pull: bool) -> Result<RunStatus> {
    if settings.stores.is_empty() {
        return Err(CliError::user("No stores configured"));
    }
    println!("{} Checking out {}...", "=>".blue().bold(), branch.cyan());

    let actions = Vcs::new(Arc::new(SystemRunner)).checkout(&settings.stores, branch, pull)?;
    if actions.is_empty() {
        println!("{} No accessible stores.", "WARN".yellow().bold());
    }
    for action in &actions {
        println!("   {} {}", "+".green(), action);
    }
    Ok(RunStatus::Clean)
}
