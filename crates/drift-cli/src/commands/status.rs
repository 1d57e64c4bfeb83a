//! Status command implementation

use std::sync::Arc;

use colored::Colorize;

use drift_core::{Settings, SystemRunner, Vcs};

use super::RunStatus;
use crate::error::Result;

/// Length of the abbreviated revision shown in text output
const SHORT_REV: usize = 12;

/// Run the status command
pub fn run_status(settings: &Settings, json: bool) -> Result<RunStatus> {
    let statuses = Vcs::new(Arc::new(SystemRunner)).status(&settings.stores);

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(RunStatus::Clean);
    }

    println!(
        "{} system {}",
        "=>".blue().bold(),
        settings.system.as_deref().unwrap_or("undefined").cyan()
    );
    for status in &statuses {
        let branch = status.branch.as_deref().unwrap_or("unknown");
        let head = status
            .head
            .as_deref()
            .map(|head| head.chars().take(SHORT_REV).collect::<String>())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<10} {} {} {}",
            status.name.bold(),
            branch.green(),
            head.dimmed(),
            status.path.display()
        );
    }
    Ok(RunStatus::Clean)
}
