//! Verify command implementation
//!
//! Compares every category of the requested targets without touching the
//! live system.

use colored::Colorize;

use drift_core::{Collaborators, Reconciler, ReconciliationResult, RunReport, Settings, Target};

use super::RunStatus;
use crate::error::Result;

/// Run the verify command
pub fn run_verify(settings: &Settings, targets: Vec<Target>, json: bool) -> Result<RunStatus> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        if !json {
            println!("{} Verifying {}...", "=>".blue().bold(), target.name.cyan());
        }
        let mut reconciler = Reconciler::new(settings.clone(), target, Collaborators::system(settings))?;
        let report = reconciler.verify()?;
        if !json {
            print_report(&report);
        }
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let clean = reports.iter().all(RunReport::is_clean);
    if !json && !clean {
        println!();
        println!("Run {} to repair.", "drift update".cyan());
    }
    Ok(RunStatus::from_clean(clean))
}

/// Print one target's verification in human-readable form
pub(crate) fn print_report(report: &RunReport) {
    for result in &report.results {
        print_result(result);
    }
    if report.is_clean() {
        println!("{} {}: no drift detected.", "OK".green().bold(), report.target);
    } else {
        println!(
            "{} {}: {} difference(s).",
            "DRIFTED".red().bold(),
            report.target,
            report.total_differences()
        );
    }
}

fn print_result(result: &ReconciliationResult) {
    if result.is_clean() && result.skipped.is_empty() {
        println!("   {} {}", "ok".green(), result.category);
        return;
    }

    println!(
        "   {} {} ({} difference(s))",
        if result.is_clean() { "ok".green() } else { "!".red() },
        result.category.bold(),
        result.difference_count()
    );
    for name in &result.desired_only {
        println!("      {} {} {}", "+".yellow(), name.cyan(), "missing on live system".dimmed());
    }
    for name in &result.observed_only {
        println!("      {} {} {}", "-".yellow(), name.cyan(), "not in desired state".dimmed());
    }
    for (name, records) in &result.value_diffs {
        for record in records {
            println!("      {} {}: {}", "~".red(), name.cyan(), record);
        }
    }
    for name in &result.permission_violations {
        println!("      {} {} {}", "~".red(), name.cyan(), "owner, group or mode differ".dimmed());
    }
    for skipped in &result.skipped {
        println!(
            "      {} {} {}",
            "?".dimmed(),
            skipped.name.cyan(),
            format!("skipped: {}", skipped.reason).as_str().dimmed()
        );
    }
}
