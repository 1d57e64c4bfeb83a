//! Desired and observed object enumeration
//!
//! The desired side of a category is assembled from a layered search path:
//! for every store, `<store>/<maintype>/<generic>` then
//! `<store>/<maintype>/<system>_<generic>`, where `<generic>` is
//! `[<subtype>_]<objtype>`. Each existing layer is walked into its own map
//! and the maps are folded left to right, later layers overriding earlier
//! ones.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use drift_fs::{NormalizedPath, StorePath};
use walkdir::WalkDir;

use crate::config::StoreConfig;
use crate::manifest::{Attributes, Manifest, ManifestStore};
use crate::object::ManagedObject;
use crate::target::Category;
use crate::{Error, Result};

/// One directory of a category's desired-state search path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDir {
    pub store: String,
    pub path: PathBuf,
}

/// Name of the generic directory for an object type
pub fn generic_dir(objtype: &str, subtype: Option<&str>) -> String {
    match subtype {
        Some(subtype) => format!("{subtype}_{objtype}"),
        None => objtype.to_string(),
    }
}

/// Every candidate directory, existing or not, in search order
pub fn candidate_dirs(
    stores: &[StoreConfig],
    system: &str,
    maintype: &str,
    objtype: &str,
    subtype: Option<&str>,
) -> Vec<SearchDir> {
    let generic = generic_dir(objtype, subtype);
    let specific = format!("{system}_{generic}");
    stores
        .iter()
        .flat_map(|store| {
            [&generic, &specific].map(|dir| SearchDir {
                store: store.name.clone(),
                path: store.path.join(maintype).join(dir),
            })
        })
        .collect()
}

/// The existing, readable directories of the search path
pub fn search_paths(
    stores: &[StoreConfig],
    system: &str,
    maintype: &str,
    objtype: &str,
    subtype: Option<&str>,
) -> Vec<SearchDir> {
    candidate_dirs(stores, system, maintype, objtype, subtype)
        .into_iter()
        .filter(|dir| {
            let readable = fs::read_dir(&dir.path).is_ok();
            tracing::debug!(path = ?dir.path, readable, "Search path candidate");
            readable
        })
        .collect()
}

/// One object as seen in a single layer
#[derive(Debug, Clone)]
struct LayerEntry {
    source: PathBuf,
    store: String,
    attributes: Attributes,
}

type Layer = BTreeMap<String, LayerEntry>;

fn walk_layer(dir: &SearchDir, manifest: &Manifest) -> Result<Layer> {
    let mut layer = Layer::new();

    for entry in WalkDir::new(&dir.path).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() || entry.file_name() == StorePath::Manifest.as_str() {
            continue;
        }
        let Some(name) = NormalizedPath::relative_to(entry.path(), &dir.path) else {
            continue;
        };
        let name = name.as_str().to_string();
        let attributes = manifest.get(&name).cloned().unwrap_or_default();
        layer.insert(
            name,
            LayerEntry {
                source: entry.path().to_path_buf(),
                store: dir.store.clone(),
                attributes,
            },
        );
    }

    tracing::debug!(path = ?dir.path, objects = layer.len(), "Walked layer");
    Ok(layer)
}

fn overlay(mut acc: Layer, layer: Layer) -> Layer {
    for (name, entry) in layer {
        match acc.get_mut(&name) {
            Some(existing) => {
                existing.source = entry.source;
                existing.store = entry.store;
                existing.attributes.extend(entry.attributes);
            }
            None => {
                acc.insert(name, entry);
            }
        }
    }
    acc
}

/// Enumerate the desired objects of a category
///
/// # Errors
///
/// Fails with [`Error::NoSearchPath`] when no search directory exists, and
/// with [`Error::InvalidAttribute`] for malformed manifest entries.
pub fn enumerate(
    stores: &[StoreConfig],
    system: &str,
    category: &Category,
) -> Result<BTreeMap<String, ManagedObject>> {
    enumerate_with(stores, system, category, &mut ManifestStore::new())
}

/// [`enumerate`] reading layer manifests through `manifests`, so each
/// directory's manifest is loaded at most once per run
pub fn enumerate_with(
    stores: &[StoreConfig],
    system: &str,
    category: &Category,
    manifests: &mut ManifestStore,
) -> Result<BTreeMap<String, ManagedObject>> {
    let subtype = category.subtype.as_deref();
    let dirs = search_paths(stores, system, &category.maintype, &category.objtype, subtype);
    if dirs.is_empty() {
        return Err(Error::NoSearchPath {
            category: category.name.clone(),
            searched: candidate_dirs(stores, system, &category.maintype, &category.objtype, subtype)
                .into_iter()
                .map(|dir| dir.path)
                .collect(),
        });
    }

    let layers = dirs
        .iter()
        .map(|dir| walk_layer(dir, manifests.get_or_load(&dir.path)?))
        .collect::<Result<Vec<_>>>()?;
    let merged = layers.into_iter().fold(Layer::new(), overlay);

    merged
        .into_iter()
        .map(|(name, entry)| {
            let mut object = ManagedObject::new(name.clone(), entry.source);
            object.store = Some(entry.store);
            object.apply_attributes(&entry.attributes)?;
            if let Some(defaults) = category.defaults.get(&name) {
                object.apply_attributes(defaults)?;
            }
            Ok((name, object))
        })
        .collect()
}

/// Filters for flat observed listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter {
    /// File name ends with the given suffix
    Suffix(&'static str),
    /// Site config files: anything not prefixed `cray_`, plus `cray_image_groups.yaml`
    ConfigFiles,
    /// Preload lists not shipped by the vendor
    Preload,
}

impl NameFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Suffix(suffix) => name.ends_with(suffix),
            NameFilter::ConfigFiles => name == "cray_image_groups.yaml" || !name.starts_with("cray_"),
            NameFilter::Preload => name.contains("preload") && !name.contains("cray"),
        }
    }
}

/// How a category's observed objects are found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedSource {
    /// Every regular file below `root`, named by relative path
    Walk(PathBuf),
    /// Regular files directly in `root` accepted by `filter`, plus any
    /// file the category names in its defaults
    List { root: PathBuf, filter: NameFilter },
    /// Each desired object declares its own `observed_path`
    Manifest,
}

impl ObservedSource {
    /// Directory that must exist on the observed side, if any
    pub fn root(&self) -> Option<&Path> {
        match self {
            ObservedSource::Walk(root) | ObservedSource::List { root, .. } => Some(root),
            ObservedSource::Manifest => None,
        }
    }

    /// Where the observed copy of `object` lives or would be written
    pub fn target_path(&self, object: &ManagedObject) -> Option<PathBuf> {
        match self.root() {
            Some(root) => Some(NormalizedPath::new(root).join(&object.name).to_native()),
            None => object.observed_path.clone(),
        }
    }
}

/// Observed objects of one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedSet {
    /// Existing observed objects by name
    pub paths: BTreeMap<String, PathBuf>,
    /// Desired objects with no declared observed location
    pub unmanaged: Vec<String>,
}

/// Enumerate the observed objects of a category
///
/// # Errors
///
/// Fails with [`Error::ObservedRootMissing`] when the root of a walked or
/// listed category does not exist.
pub fn observe(
    category: &Category,
    desired: &BTreeMap<String, ManagedObject>,
) -> Result<ObservedSet> {
    let mut set = ObservedSet::default();

    if let Some(root) = category.observed.root()
        && !root.is_dir()
    {
        return Err(Error::ObservedRootMissing {
            category: category.name.clone(),
            path: root.to_path_buf(),
        });
    }

    match &category.observed {
        ObservedSource::Walk(root) => {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|e| Error::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(name) = NormalizedPath::relative_to(entry.path(), root) {
                    set.paths.insert(name.as_str().to_string(), entry.path().to_path_buf());
                }
            }
        }
        ObservedSource::List { root, filter } => {
            for entry in fs::read_dir(root).map_err(|e| drift_fs::Error::io(root, e))? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                let managed = category.defaults.contains_key(&name);
                if entry.path().is_file() && (managed || filter.matches(&name)) {
                    set.paths.insert(name, entry.path());
                }
            }
        }
        ObservedSource::Manifest => {
            for (name, object) in desired {
                match &object.observed_path {
                    Some(path) if path.exists() => {
                        set.paths.insert(name.clone(), path.clone());
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!(object = %name, "No observed path declared, skipping");
                        set.unmanaged.push(name.clone());
                    }
                }
            }
        }
    }

    tracing::debug!(category = %category.name, observed = set.paths.len(), "Observed objects");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NameFilter::Suffix("worksheet.yaml"), "cray_net_worksheet.yaml", true)]
    #[case(NameFilter::Suffix("worksheet.yaml"), "cray_net_config.yaml", false)]
    #[case(NameFilter::ConfigFiles, "cray_image_groups.yaml", true)]
    #[case(NameFilter::ConfigFiles, "cray_net_config.yaml", false)]
    #[case(NameFilter::ConfigFiles, "site_config.yaml", true)]
    #[case(NameFilter::Preload, "site.preload", true)]
    #[case(NameFilter::Preload, "cray_compute.preload", false)]
    #[case(NameFilter::Preload, "site.list", false)]
    fn name_filters(#[case] filter: NameFilter, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(filter.matches(name), expected);
    }

    #[test]
    fn candidates_interleave_generic_and_system_dirs() {
        let stores = vec![
            StoreConfig::new("primary", "/p"),
            StoreConfig::new("secured", "/s"),
        ];
        let dirs: Vec<PathBuf> = candidate_dirs(&stores, "sys", "imps", "config", Some("cle"))
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/p/imps/cle_config"),
                PathBuf::from("/p/imps/sys_cle_config"),
                PathBuf::from("/s/imps/cle_config"),
                PathBuf::from("/s/imps/sys_cle_config"),
            ]
        );
    }
}
