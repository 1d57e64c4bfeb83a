//! Seed desired-state stores from live files
//!
//! For targets whose objects declare their own observed path, every live
//! file that exists is copied into the system-specific directory of the
//! store it belongs to, and its attributes are recorded in that
//! directory's manifest. Committing the result is left to the operator.

use std::path::{Path, PathBuf};

use drift_fs::NormalizedPath;
use nix::unistd::{AccessFlags, access};
use serde::Serialize;

use crate::Result;
use crate::config::Settings;
use crate::enumerate::{ObservedSource, generic_dir};
use crate::manifest::{ManifestStore, SaveOutcome};
use crate::object::ManagedObject;
use crate::target::Target;

/// Outcome of an import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Follow-up actions for the operator
    pub actions: Vec<String>,
    /// Store files written
    pub imported: Vec<PathBuf>,
}

/// Copies live files into the stores
pub struct Importer<'a> {
    settings: &'a Settings,
}

impl<'a> Importer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn import(&self, target: &Target) -> Result<ImportReport> {
        let system = self.settings.system()?;
        let mut report = ImportReport::default();
        let mut manifests = ManifestStore::new();

        for store in &self.settings.stores {
            if !is_writable(&store.path) {
                tracing::warn!(store = %store.name, path = ?store.path, "Cannot write to store, skipping import");
                continue;
            }

            let mut touched = false;
            for category in &target.categories {
                if category.observed != ObservedSource::Manifest {
                    continue;
                }
                let dir = store.path.join(&category.maintype).join(format!(
                    "{system}_{}",
                    generic_dir(&category.objtype, category.subtype.as_deref())
                ));
                drift_fs::io::ensure_dir(&NormalizedPath::new(&dir))?;
                touched = true;

                for (name, attributes) in &category.defaults {
                    let mut object = ManagedObject::new(name.as_str(), dir.join(name));
                    object.apply_attributes(attributes)?;
                    if object.store.as_deref() != Some(store.name.as_str()) {
                        continue;
                    }
                    let Some(live) = object.observed_path.as_ref().filter(|p| p.is_file()) else {
                        continue;
                    };

                    let destination = NormalizedPath::new(&dir).join(name);
                    drift_fs::io::copy_file(&NormalizedPath::new(live), &destination)?;
                    tracing::info!(object = %name, from = ?live, to = %destination, "Imported object");
                    manifests.get_or_load(&dir)?.insert(name.as_str(), attributes.clone());
                    report.imported.push(destination.to_native());
                }
            }

            if touched {
                report.actions.push(format!(
                    "Add/Commit {} items in {}",
                    target.name.to_uppercase(),
                    store.path.display()
                ));
            }
        }

        for (dir, outcome) in manifests.save_all()? {
            if outcome == SaveOutcome::Written {
                report.actions.insert(0, format!("Updated manifest in {}", dir.display()));
            }
        }
        Ok(report)
    }
}

fn is_writable(path: &Path) -> bool {
    path.is_dir() && access(path, AccessFlags::W_OK).is_ok()
}
