//! Per-directory object metadata
//!
//! Each enumerated directory may hold a `.driftflow.manifest.yaml` mapping
//! object names to attribute maps:
//!
//! ```yaml
//! xtremoted/xtremoted.key:
//!   format: raw
//!   mode: "0400"
//!   owner: crayadm
//! ```
//!
//! A manifest is loaded once per run, mutated in memory and written back
//! only when its content changed structurally.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use drift_fs::{ConfigStore, NormalizedPath, StorePath};

use crate::Result;

/// Attribute map of one object as stored in a manifest
pub type Attributes = BTreeMap<String, serde_yaml::Value>;

/// Result of [`Manifest::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Content unchanged since load; nothing was written
    Identical,
    /// The file was rewritten
    Written,
}

/// The manifest of one directory
#[derive(Debug, Clone)]
pub struct Manifest {
    dir: PathBuf,
    original: BTreeMap<String, Attributes>,
    current: BTreeMap<String, Attributes>,
}

impl Manifest {
    /// Path of the manifest file inside `dir`
    pub fn path_in(dir: &Path) -> NormalizedPath {
        NormalizedPath::new(dir).join(StorePath::Manifest.as_str())
    }

    /// Load the manifest of `dir`. A missing file is an empty manifest.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but is unreadable or is not a mapping of
    /// names to attribute maps.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let path = Self::path_in(&dir);
        let entries: BTreeMap<String, Attributes> = if path.to_native().is_file() {
            ConfigStore::new().load_or_default(&path)?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path, entries = entries.len(), "Loaded manifest");
        Ok(Self {
            dir,
            original: entries.clone(),
            current: entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, name: &str) -> Option<&Attributes> {
        self.current.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, attributes: Attributes) -> Option<Attributes> {
        self.current.insert(name.into(), attributes)
    }

    pub fn remove(&mut self, name: &str) -> Option<Attributes> {
        self.current.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, Attributes> {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Whether the in-memory content differs structurally from what was loaded
    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    /// Write the manifest back if it changed
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let path = Self::path_in(&self.dir);
        if !self.is_modified() {
            tracing::info!(path = %path, "manifest identical");
            return Ok(SaveOutcome::Identical);
        }
        ConfigStore::new().save(&path, &self.current)?;
        self.original = self.current.clone();
        tracing::info!(path = %path, "manifest altered");
        Ok(SaveOutcome::Written)
    }
}

/// Caches one [`Manifest`] per directory for the duration of a run
#[derive(Debug, Default)]
pub struct ManifestStore {
    manifests: BTreeMap<PathBuf, Manifest>,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The manifest of `dir`, loading it on first access
    pub fn get_or_load(&mut self, dir: &Path) -> Result<&mut Manifest> {
        match self.manifests.entry(dir.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Manifest::load(dir)?)),
        }
    }

    pub fn get(&self, dir: &Path) -> Option<&Manifest> {
        self.manifests.get(dir)
    }

    /// Save every cached manifest; unchanged ones are left untouched
    pub fn save_all(&mut self) -> Result<Vec<(PathBuf, SaveOutcome)>> {
        let mut outcomes = Vec::with_capacity(self.manifests.len());
        for (dir, manifest) in &mut self.manifests {
            outcomes.push((dir.clone(), manifest.save()?));
        }
        Ok(outcomes)
    }
}
