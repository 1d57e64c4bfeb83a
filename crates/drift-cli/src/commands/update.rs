//! Update command implementation

use colored::Colorize;

use drift_core::{Collaborators, Reconciler, Settings, Target, UpdateOptions, UpdateOutcome};

use super::RunStatus;
use super::verify::print_report;
use crate::error::Result;

/// Run the update command
///
/// Drift that remains after the update (or, for a dry run, the drift
/// that would be repaired) yields [`RunStatus::Drift`].
pub fn run_update(
    settings: &Settings,
    targets: Vec<Target>,
    dry_run: bool,
    json: bool,
) -> Result<RunStatus> {
    let options = UpdateOptions { dry_run };
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets {
        if !json {
            let verb = if dry_run { "Previewing update of" } else { "Updating" };
            println!("{} {} {}...", "=>".blue().bold(), verb, target.name.cyan());
        }
        let mut reconciler = Reconciler::new(settings.clone(), target, Collaborators::system(settings))?;
        let outcome = reconciler.update(&options)?;
        if !json {
            print_outcome(&outcome);
        }
        outcomes.push(outcome);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }

    let unresolved: usize = outcomes.iter().map(UpdateOutcome::unresolved).sum();
    Ok(RunStatus::from_clean(unresolved == 0))
}

pub(crate) fn print_outcome(outcome: &UpdateOutcome) {
    if outcome.actions.is_empty() {
        println!("{} Already up to date. No changes needed.", "OK".green().bold());
    } else {
        for action in &outcome.actions {
            let marker = if action.starts_with("[dry-run]") {
                "~".yellow()
            } else if action.starts_with("Validation") {
                "!".red()
            } else {
                "+".green()
            };
            println!("   {} {}", marker, action);
        }
    }

    match &outcome.after {
        Some(after) if !after.is_clean() => {
            println!("{} Drift remains after update:", "WARN".yellow().bold());
            print_report(after);
        }
        Some(_) => {}
        None if !outcome.before.is_clean() => {
            println!();
            println!(
                "{} {} difference(s) would be repaired. Run without {} to apply.",
                "DRY-RUN".yellow().bold(),
                outcome.before.total_differences(),
                "--dry-run".cyan()
            );
        }
        None => {}
    }
}
