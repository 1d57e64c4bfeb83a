//! Version control status and checkout of the desired-state stores
//!
//! Stores are plain git checkouts; every git invocation goes through the
//! [`ProcessRunner`] so that it can be faked in tests.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::Result;
use crate::collab::{ProcessRunner, run_checked};
use crate::config::StoreConfig;

static BRANCH_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s+(.*)$").unwrap());

/// Branch and HEAD of one store; `None` when unknown or inaccessible
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub name: String,
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: Option<String>,
}

/// Git operations over the configured stores
pub struct Vcs {
    runner: Arc<dyn ProcessRunner>,
}

impl Vcs {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    fn git(&self, store: &StoreConfig, args: &[&str]) -> Vec<String> {
        let mut argv = vec![
            "git".to_string(),
            "-C".to_string(),
            store.path.to_string_lossy().to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    /// Report the current branch and HEAD revision of every store
    pub fn status(&self, stores: &[StoreConfig]) -> Vec<StoreStatus> {
        stores
            .iter()
            .map(|store| {
                let mut status = StoreStatus {
                    name: store.name.clone(),
                    path: store.path.clone(),
                    branch: None,
                    head: None,
                };
                if !is_readable(store) {
                    tracing::debug!(store = %store.name, "Store inaccessible");
                    return status;
                }
                status.branch = self
                    .stdout(&self.git(store, &["status", "-s", "--porcelain", "-b", "-u", "no"]))
                    .and_then(|out| parse_branch(&out));
                status.head = self
                    .stdout(&self.git(store, &["rev-parse", "HEAD"]))
                    .map(|out| out.trim().to_string())
                    .filter(|head| !head.is_empty());
                status
            })
            .collect()
    }

    /// Check out `branch` in every readable store, fetching and pulling
    /// first when `pull` is set and the store has a remote
    ///
    /// # Errors
    ///
    /// Any failing git command aborts the checkout.
    pub fn checkout(&self, stores: &[StoreConfig], branch: &str, pull: bool) -> Result<Vec<String>> {
        let mut actions = Vec::new();
        for store in stores.iter().filter(|store| is_readable(store)) {
            let remotes = run_checked(self.runner.as_ref(), &self.git(store, &["remote"]))?;
            let sync = pull && !remotes.stdout.trim().is_empty();

            if sync {
                run_checked(self.runner.as_ref(), &self.git(store, &["fetch"]))?;
            }
            run_checked(self.runner.as_ref(), &self.git(store, &["checkout", branch]))?;
            if sync {
                run_checked(self.runner.as_ref(), &self.git(store, &["pull"]))?;
            }

            tracing::info!(store = %store.name, branch, "Checked out");
            actions.push(format!("Checked out {branch} in {}", store.path.display()));
        }
        Ok(actions)
    }

    fn stdout(&self, argv: &[String]) -> Option<String> {
        match self.runner.run(argv) {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                tracing::warn!(command = %argv.join(" "), code = output.code, "git failed");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "git could not run");
                None
            }
        }
    }
}

fn is_readable(store: &StoreConfig) -> bool {
    std::fs::read_dir(&store.path).is_ok()
}

/// Branch name from `git status -b --porcelain` output
pub fn parse_branch(output: &str) -> Option<String> {
    let first = output.trim().lines().next()?;
    let first = first.split("...").next().unwrap_or(first);
    BRANCH_LINE
        .captures(first.trim())
        .map(|caps| caps[1].trim().to_string())
}
