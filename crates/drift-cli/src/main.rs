//! driftflow CLI
//!
//! Verifies and reconciles configuration files against their desired state.
//!
//! Exit status: 0 when clean, 1 on a fatal error, 2 when drift remains.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use drift_core::{SettingsOverrides, SettingsResolver, StoreConfig};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::RunStatus;
use error::Result;

fn main() {
    match run() {
        Ok(RunStatus::Clean) => {}
        Ok(RunStatus::Drift) => std::process::exit(2),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<RunStatus> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!("{} driftflow CLI", "drift".green().bold());
        println!();
        println!("Run {} for available commands.", "drift --help".cyan());
        return Ok(RunStatus::Clean);
    };

    let overrides = SettingsOverrides {
        stores: cli
            .stores
            .iter()
            .map(|(name, path)| StoreConfig::new(name.clone(), path.clone()))
            .collect(),
        system: cli.system.clone(),
        password_file: cli.password_file.clone(),
        configset_path: cli.configset_path.clone(),
        partition: cli.partition.clone(),
    };
    let settings = SettingsResolver::new()
        .with_config_file(cli.config.clone())
        .resolve(&overrides)?;
    tracing::debug!(?settings, "Resolved settings");

    execute_command(command, settings)
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn execute_command(cmd: Commands, settings: drift_core::Settings) -> Result<RunStatus> {
    match cmd {
        Commands::Status { json } => commands::run_status(&settings, json),
        Commands::Checkout { branch, pull } => commands::run_checkout(&settings, &branch, pull),
        Commands::Verify { target, json } => {
            let targets = commands::resolve_targets(&settings, &target);
            commands::run_verify(&settings, targets, json)
        }
        Commands::Update {
            target,
            dry_run,
            json,
        } => {
            let targets = commands::resolve_targets(&settings, &target);
            commands::run_update(&settings, targets, dry_run, json)
        }
        Commands::Create { target, dry_run } => commands::run_create(&settings, &target, dry_run),
        Commands::Import { target } => commands::run_import(&settings, &target),
    }
}
