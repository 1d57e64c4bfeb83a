//! Import command implementation

use colored::Colorize;

use drift_core::{Importer, Settings, Target};

use super::RunStatus;
use crate::cli::ImportTarget;
use crate::error::Result;

/// Run the import command
pub fn run_import(settings: &Settings, target: &ImportTarget) -> Result<RunStatus> {
    let targets = match target {
        ImportTarget::All => vec![Target::hss(), Target::imps()],
        ImportTarget::Hss => vec![Target::hss()],
        ImportTarget::Imps => vec![Target::imps()],
    };

    let importer = Importer::new(settings);
    for target in targets {
        println!("{} Importing {}...", "=>".blue().bold(), target.name.cyan());
        let report = importer.import(&target)?;
        if report.imported.is_empty() {
            println!("{} No live files found to import.", "OK".green().bold());
        } else {
            println!("{} Imported {} file(s).", "OK".green().bold(), report.imported.len());
        }
        if !report.actions.is_empty() {
            println!("Next steps:");
            for action in &report.actions {
                println!("   {} {}", "-".cyan(), action);
            }
        }
    }
    Ok(RunStatus::Clean)
}
