//! Reconciliation orchestrator
//!
//! Drives one target through `verify`, `create` and `update`:
//!
//! ```text
//! Uninitialized -> Verified -> (Created | Updated) -> Validated
//! ```
//!
//! Verification never mutates anything. Update writes only objects whose
//! rendered content differs from the observed copy, then runs the target's
//! validation command, applies queued attribute corrections and verifies
//! again.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use drift_content::ParserRegistry;
use drift_fs::checksum::content_differs;
use drift_fs::{AttributeRequest, NormalizedPath};
use serde::Serialize;
use serde_json::Value;

use crate::collab::{Collaborators, run_checked};
use crate::compare::{CompareOutcome, ObjectComparer};
use crate::config::Settings;
use crate::enumerate::{ObservedSet, enumerate_with, observe};
use crate::manifest::ManifestStore;
use crate::object::ManagedObject;
use crate::report::{ReconciliationResult, RunReport};
use crate::target::{Category, Target};
use crate::variables::VariableResolver;
use crate::{Error, Result};

/// Where a reconciler is in its workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileState {
    Uninitialized,
    Verified,
    Created,
    Updated,
    Validated,
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconcileState::Uninitialized => "uninitialized",
            ReconcileState::Verified => "verified",
            ReconcileState::Created => "created",
            ReconcileState::Updated => "updated",
            ReconcileState::Validated => "validated",
        };
        f.write_str(name)
    }
}

/// Options for create and update
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// If true, simulate changes without touching the observed side.
    /// Actions will be prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
}

/// Report from a create or update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    /// Actions taken (or that would be taken)
    pub actions: Vec<String>,
    /// Observed files written
    pub written: Vec<PathBuf>,
    /// Verification before any change
    pub before: RunReport,
    /// Verification after the update; absent for dry runs
    pub after: Option<RunReport>,
}

impl UpdateOutcome {
    /// Differences left after the update
    pub fn unresolved(&self) -> usize {
        self.after
            .as_ref()
            .unwrap_or(&self.before)
            .total_differences()
    }
}

/// Everything learned about one category during verification
struct CategoryScan {
    result: ReconciliationResult,
    desired: BTreeMap<String, ManagedObject>,
    vars: Value,
}

/// Orchestrates verification and updates of one target
pub struct Reconciler {
    settings: Settings,
    system: String,
    target: Target,
    collab: Collaborators,
    registry: ParserRegistry,
    /// Layer manifests, loaded once per directory for the reconciler's lifetime
    manifests: RefCell<ManifestStore>,
    state: ReconcileState,
}

impl Reconciler {
    /// # Errors
    ///
    /// Fails with [`Error::SystemUndefined`] when no system name is set.
    pub fn new(settings: Settings, target: Target, collab: Collaborators) -> Result<Self> {
        let system = settings.system()?.to_string();
        let registry = match &collab.decryptor {
            Some(decryptor) => ParserRegistry::with_decryptor(decryptor.clone()),
            None => ParserRegistry::new(),
        };
        Ok(Self {
            settings,
            system,
            target,
            collab,
            registry,
            manifests: RefCell::new(ManifestStore::new()),
            state: ReconcileState::Uninitialized,
        })
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Compare every category of the target; never mutates anything
    pub fn verify(&mut self) -> Result<RunReport> {
        let report = self.verify_all()?.0;
        if self.state == ReconcileState::Uninitialized {
            self.state = ReconcileState::Verified;
        }
        Ok(report)
    }

    /// Provision the observed container, then update it
    ///
    /// # Errors
    ///
    /// Fails without running anything when the container already exists,
    /// and when the provisioning command exits non-zero.
    pub fn create(&mut self, options: &UpdateOptions) -> Result<UpdateOutcome> {
        self.require(&[ReconcileState::Uninitialized], "create")?;

        let (Some(container), Some(provision)) =
            (self.target.container.clone(), self.target.provision.clone())
        else {
            return Err(Error::CreateUnsupported {
                target: self.target.name.clone(),
            });
        };
        if container.exists() {
            return Err(Error::ObservedExists { path: container });
        }

        if options.dry_run {
            return self.plan_create(provision.join(" "));
        }

        tracing::info!(name = %self.target.name, "Provisioning observed container");
        run_checked(self.collab.runner.as_ref(), &provision)?;
        for root in self.target.categories.iter().filter_map(|c| c.observed.root()) {
            drift_fs::io::ensure_dir(&NormalizedPath::new(root))?;
        }
        self.state = ReconcileState::Created;

        let mut outcome = self.update(options)?;
        outcome
            .actions
            .insert(0, format!("Provisioned {}", container.display()));
        Ok(outcome)
    }

    /// Apply the desired state wherever it differs from the observed state
    pub fn update(&mut self, options: &UpdateOptions) -> Result<UpdateOutcome> {
        self.require(
            &[
                ReconcileState::Uninitialized,
                ReconcileState::Verified,
                ReconcileState::Created,
            ],
            "update",
        )?;

        let (before, scans) = self.verify_all()?;
        let mut actions = Vec::new();
        let mut written = Vec::new();
        let mut attribute_queue: Vec<(PathBuf, AttributeRequest)> = Vec::new();
        let mut validate = false;

        for (category, scan) in self.target.categories.iter().zip(&scans) {
            if scan.result.is_clean() {
                tracing::debug!(category = %category.name, "No differences, skipping");
                continue;
            }
            validate = true;
            let violations: BTreeSet<&str> = scan
                .result
                .permission_violations
                .iter()
                .map(String::as_str)
                .collect();

            for object in scan.desired.values() {
                let Some(path) = category.observed.target_path(object) else {
                    continue;
                };
                let text = match self.comparer().desired_text(object, category, &scan.vars) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(object = %object.name, error = %e, "Cannot render, not writing");
                        continue;
                    }
                };

                let changed = content_differs(&path, &text);
                if changed {
                    if options.dry_run {
                        actions.push(format!("[dry-run] Would write {}", path.display()));
                    } else {
                        drift_fs::io::write_text(&NormalizedPath::new(&path), &text)?;
                        tracing::info!(object = %object.name, path = %path.display(), "Wrote object");
                        actions.push(format!("Wrote {}", path.display()));
                        written.push(path.clone());
                    }
                }

                if object.declares_attributes() && (changed || violations.contains(object.name.as_str())) {
                    if options.dry_run {
                        actions.push(format!("[dry-run] Would set attributes on {}", path.display()));
                    } else {
                        attribute_queue.push((path, object.attribute_request()));
                    }
                }
            }
        }

        if options.dry_run {
            if validate && let Some(argv) = &self.target.validate {
                actions.push(format!("[dry-run] Would run: {}", argv.join(" ")));
            }
            return Ok(UpdateOutcome {
                actions,
                written,
                before,
                after: None,
            });
        }

        if validate && let Some(argv) = &self.target.validate {
            let command = argv.join(" ");
            match self.collab.runner.run(argv) {
                Ok(output) if output.success() => actions.push(format!("Ran {command}")),
                Ok(output) => {
                    tracing::warn!(%command, code = output.code, stderr = %output.stderr.trim(), "Validation failed");
                    actions.push(format!("Validation failed: {command} (exit code {})", output.code));
                }
                Err(e) => {
                    tracing::warn!(%command, error = %e, "Validation could not run");
                    actions.push(format!("Validation could not run: {command}"));
                }
            }
        }

        for (path, request) in &attribute_queue {
            let satisfied = self
                .collab
                .attributes
                .get(path)
                .is_ok_and(|observed| request.is_satisfied_by(&observed));
            if satisfied {
                continue;
            }
            match self.collab.attributes.set(path, request) {
                Ok(()) => actions.push(format!("Set attributes on {}", path.display())),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot set attributes");
                    actions.push(format!("Could not set attributes on {}: {e}", path.display()));
                }
            }
        }

        self.state = ReconcileState::Updated;
        let after = self.verify_all()?.0;
        self.state = ReconcileState::Validated;

        Ok(UpdateOutcome {
            actions,
            written,
            before,
            after: Some(after),
        })
    }

    fn require(&self, allowed: &[ReconcileState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(Error::InvalidTransition {
            from: self.state.to_string(),
            operation: operation.to_string(),
        })
    }

    fn comparer(&self) -> ObjectComparer<'_> {
        ObjectComparer::new(&self.registry, self.collab.renderer.as_ref(), &self.system)
    }

    fn variables(&self) -> VariableResolver<'_> {
        VariableResolver::new(&self.settings.stores, &self.system, self.collab.decryptor.clone())
    }

    fn plan_create(&self, provision: String) -> Result<UpdateOutcome> {
        let mut actions = vec![format!("[dry-run] Would run: {provision}")];
        let mut before = RunReport::new(&self.target.name);
        for category in &self.target.categories {
            let desired = self.enumerate(category)?;
            let mut result = ReconciliationResult::new(&category.name);
            for object in desired.values() {
                if let Some(path) = category.observed.target_path(object) {
                    actions.push(format!("[dry-run] Would write {}", path.display()));
                }
                result.desired_only.insert(object.name.clone());
            }
            before.results.push(result);
        }
        Ok(UpdateOutcome {
            actions,
            written: Vec::new(),
            before,
            after: None,
        })
    }

    fn verify_all(&self) -> Result<(RunReport, Vec<CategoryScan>)> {
        let mut report = RunReport::new(&self.target.name);
        let mut scans = Vec::with_capacity(self.target.categories.len());
        for category in &self.target.categories {
            let scan = self.scan(category)?;
            tracing::info!(
                category = %category.name,
                differences = scan.result.difference_count(),
                "Verified category"
            );
            report.results.push(scan.result.clone());
            scans.push(scan);
        }
        Ok((report, scans))
    }

    fn enumerate(&self, category: &Category) -> Result<BTreeMap<String, ManagedObject>> {
        let mut manifests = self.manifests.borrow_mut();
        enumerate_with(&self.settings.stores, &self.system, category, &mut manifests)
    }

    fn scan(&self, category: &Category) -> Result<CategoryScan> {
        let desired = self.enumerate(category)?;
        let observed = observe(category, &desired)?;
        let vars = Value::Object(self.variables().vars_for(&self.target, category)?);

        let mut result = ReconciliationResult::new(&category.name);
        self.compare_category(category, &desired, &observed, &vars, &mut result)?;

        Ok(CategoryScan {
            result,
            desired,
            vars,
        })
    }

    fn compare_category(
        &self,
        category: &Category,
        desired: &BTreeMap<String, ManagedObject>,
        observed: &ObservedSet,
        vars: &Value,
        result: &mut ReconciliationResult,
    ) -> Result<()> {
        for name in &observed.unmanaged {
            result.skip(name, "no observed path declared");
        }
        result.observed_only = observed
            .paths
            .keys()
            .filter(|name| !desired.contains_key(*name))
            .cloned()
            .collect();

        let comparer = self.comparer();
        for (name, object) in desired {
            if observed.unmanaged.contains(name) {
                continue;
            }
            let Some(path) = observed.paths.get(name) else {
                result.desired_only.insert(name.clone());
                continue;
            };

            match comparer.compare(object, path, category, vars)? {
                CompareOutcome::Compared(records) => result.add_diffs(name, records),
                CompareOutcome::Skipped(reason) => result.skip(name, reason),
            }

            if object.declares_attributes() {
                match self.collab.attributes.get(path) {
                    Ok(attributes) if object.attribute_request().is_satisfied_by(&attributes) => {}
                    Ok(_) => result.permission_violations.push(name.clone()),
                    Err(e) => {
                        tracing::warn!(object = %name, error = %e, "Cannot read attributes");
                        result.skip(name, format!("could not read attributes: {e}"));
                    }
                }
            }
        }
        Ok(())
    }
}
