//! Create command implementation

use colored::Colorize;

use drift_core::{Collaborators, Reconciler, Settings, Target, UpdateOptions};

use super::RunStatus;
use super::update::print_outcome;
use crate::cli::CreateTarget;
use crate::error::Result;

/// Run the create command
pub fn run_create(settings: &Settings, target: &CreateTarget, dry_run: bool) -> Result<RunStatus> {
    let target = match target {
        CreateTarget::Cfgset(args) => Target::cfgset(settings, &args.ctype, &args.name),
    };
    println!("{} Creating {}...", "=>".blue().bold(), target.name.cyan());

    let mut reconciler = Reconciler::new(settings.clone(), target, Collaborators::system(settings))?;
    let outcome = reconciler.create(&UpdateOptions { dry_run })?;
    print_outcome(&outcome);

    if dry_run {
        return Ok(RunStatus::Clean);
    }
    Ok(RunStatus::from_clean(outcome.unresolved() == 0))
}
