//! Enumeration, comparison and reconciliation engine for driftflow
//!
//! This crate sits between the content layer and the CLI:
//!
//! - **Settings**: layered TOML resolution of stores, system name and paths
//! - **Enumeration**: desired objects from a layered store search path,
//!   observed objects from walks, listings or declared paths
//! - **Reconciler**: verify, create and update of a target with dry-run
//! - **Import / VCS**: seeding stores from live files, git status and checkout
//!
//! # Architecture
//!
//! ```text
//!                      drift-cli
//!                          |
//!                      drift-core
//!                          |
//!               +----------+----------+
//!               |                     |
//!           drift-fs            drift-content
//! ```
//!
//! # Example
//!
//! ```ignore
//! use drift_core::{Collaborators, Reconciler, SettingsOverrides, SettingsResolver, Target};
//!
//! let settings = SettingsResolver::new().resolve(&SettingsOverrides::default())?;
//! let collab = Collaborators::system(&settings);
//! let mut reconciler = Reconciler::new(settings, Target::hss(), collab)?;
//! let report = reconciler.verify()?;
//! println!("{} differences", report.total_differences());
//! ```

pub mod collab;
pub mod compare;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod import;
pub mod manifest;
pub mod object;
pub mod reconcile;
pub mod report;
pub mod target;
pub mod variables;
pub mod vcs;

pub use collab::{
    AnsibleVaultCommand, Collaborators, MiniJinjaRenderer, ProcessOutput, ProcessRunner,
    SystemRunner, TemplateRenderer,
};
pub use compare::{CompareOutcome, ObjectComparer};
pub use config::{Settings, SettingsOverrides, SettingsResolver, StoreConfig};
pub use enumerate::{
    NameFilter, ObservedSet, ObservedSource, SearchDir, enumerate, enumerate_with, observe, search_paths,
};
pub use error::{Error, Result};
pub use import::{ImportReport, Importer};
pub use manifest::{Attributes, Manifest, ManifestStore, SaveOutcome};
pub use object::ManagedObject;
pub use reconcile::{ReconcileState, Reconciler, UpdateOptions, UpdateOutcome};
pub use report::{ReconciliationResult, RunReport, SkippedObject};
pub use target::{BuiltinObject, Category, MANAGED_HSS, MANAGED_IMPS, Target};
pub use variables::{VariableResolver, Variables};
pub use vcs::{StoreStatus, Vcs};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_config_not_found_displays_correctly() {
        let path = PathBuf::from("/path/to/config.toml");
        let error = Error::ConfigNotFound { path: path.clone() };

        let display = format!("{}", error);
        assert!(
            display.contains("/path/to/config.toml"),
            "Error display should contain the path, got: {}",
            display
        );
    }

    #[test]
    fn content_errors_pass_through() {
        let error: Error = drift_content::Error::UnknownFormat("toml".into()).into();
        assert_eq!(error.to_string(), drift_content::Error::UnknownFormat("toml".into()).to_string());
    }
}
