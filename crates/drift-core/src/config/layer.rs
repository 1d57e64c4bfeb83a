//! One TOML settings layer
//!
//! Every field is optional so that a layer only overrides what it names.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named desired-state store (a version-controlled checkout)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Settings as written in a single TOML file
///
/// ```toml
/// system = "sys"
/// configset_path = "/var/opt/cray/imps/config/sets"
///
/// [[stores]]
/// name = "primary"
/// path = "/srv/git/primary"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    /// Ordered stores; a layer naming stores replaces the whole list
    #[serde(default)]
    pub stores: Option<Vec<StoreConfig>>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub password_file: Option<PathBuf>,
    #[serde(default)]
    pub configset_path: Option<PathBuf>,
    #[serde(default)]
    pub partition: Option<String>,
}

impl SettingsLayer {
    /// Parse a layer from TOML content
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::SettingsParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge another layer into this one; `other` wins where it is set
    pub fn merge(&mut self, other: SettingsLayer) {
        if other.stores.is_some() {
            self.stores = other.stores;
        }
        if other.system.is_some() {
            self.system = other.system;
        }
        if other.password_file.is_some() {
            self.password_file = other.password_file;
        }
        if other.configset_path.is_some() {
            self.configset_path = other.configset_path;
        }
        if other.partition.is_some() {
            self.partition = other.partition;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_layer() {
        let layer = SettingsLayer::parse("system = \"sys\"\n", Path::new("x.toml")).unwrap();
        assert_eq!(layer.system.as_deref(), Some("sys"));
        assert!(layer.stores.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SettingsLayer::parse("sytsem = \"sys\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, Error::SettingsParse { .. }));
    }

    #[test]
    fn merge_overrides_only_set_fields() {
        let mut base = SettingsLayer {
            system: Some("a".into()),
            partition: Some("p0".into()),
            ..Default::default()
        };
        base.merge(SettingsLayer {
            partition: Some("p1".into()),
            ..Default::default()
        });
        assert_eq!(base.system.as_deref(), Some("a"));
        assert_eq!(base.partition.as_deref(), Some("p1"));
    }
}
