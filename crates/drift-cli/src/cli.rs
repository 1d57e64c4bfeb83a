//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// driftflow - Detect and reconcile configuration drift
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file loaded after the site and user layers
    #[arg(short, long, global = true, env = "DRIFTFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Desired-state store as NAME=PATH; replaces a configured store of the same name
    #[arg(long = "store", global = true, value_parser = parse_store)]
    pub stores: Vec<(String, PathBuf)>,

    /// System name used to select system-specific layers
    #[arg(long, global = true)]
    pub system: Option<String>,

    /// Root directory of config sets
    #[arg(long, global = true)]
    pub configset_path: Option<PathBuf>,

    /// Vault password file used to decrypt secrets
    #[arg(long, global = true)]
    pub password_file: Option<PathBuf>,

    /// Partition name
    #[arg(long, global = true)]
    pub partition: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show branch and revision of every store
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check out a branch in every store
    Checkout {
        /// Branch to check out
        branch: String,

        /// Fetch and pull from the remote first
        #[arg(long)]
        pull: bool,
    },

    /// Compare the desired state with the live system
    ///
    /// Exits with status 2 when differences are found.
    ///
    /// Examples:
    ///   drift verify all
    ///   drift verify cfgset p0
    ///   drift verify cfgset --type cle p0 --json
    Verify {
        #[command(subcommand)]
        target: TargetArg,

        /// Output as JSON for scripting
        #[arg(long, global = true)]
        json: bool,
    },

    /// Write the desired state wherever the live system differs
    Update {
        #[command(subcommand)]
        target: TargetArg,

        /// Preview changes without applying them
        #[arg(long, global = true)]
        dry_run: bool,

        /// Output as JSON for CI/CD integration
        #[arg(long, global = true)]
        json: bool,
    },

    /// Provision a new target and populate it
    Create {
        #[command(subcommand)]
        target: CreateTarget,

        /// Preview changes without applying them
        #[arg(long, global = true)]
        dry_run: bool,
    },

    /// Copy live files into the desired-state stores
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
}

/// Targets accepted by verify and update
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TargetArg {
    /// Every built-in target
    All,
    /// Hardware supervisory system files
    Hss,
    /// Image management service files
    Imps,
    /// One config set
    Cfgset(CfgsetArgs),
}

/// Targets that can be provisioned
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CreateTarget {
    /// A new config set
    Cfgset(CfgsetArgs),
}

/// Targets whose live files can be imported
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    All,
    Hss,
    Imps,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CfgsetArgs {
    /// Config set name
    pub name: String,

    /// Config set type
    #[arg(short = 't', long = "type", default_value = drift_core::target::DEFAULT_CFGSET_TYPE)]
    pub ctype: String,
}

fn parse_store(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{value}'")),
    }
}
