//! Settings resolution with hierarchical merge

use crate::{Error, Result};
use drift_fs::StorePath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::layer::{SettingsLayer, StoreConfig};

/// Root under which the default stores live
pub const DEFAULT_STORE_ROOT: &str = "/var/opt/driftflow/git";
/// Default config-set root on the managed host
pub const DEFAULT_CONFIGSET_PATH: &str = "/var/opt/cray/imps/config/sets";
/// Default partition name
pub const DEFAULT_PARTITION: &str = "p0";
/// Name of the store holding secrets and key material
pub const SECURED_STORE: &str = "secured";

const CLUSTERNAME_FILE: &str = "/etc/clustername";

/// The effective settings for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Desired-state stores in search order
    pub stores: Vec<StoreConfig>,
    pub system: Option<String>,
    pub password_file: Option<PathBuf>,
    pub configset_path: PathBuf,
    pub partition: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stores: vec![
                StoreConfig::new("primary", Path::new(DEFAULT_STORE_ROOT).join("primary")),
                StoreConfig::new(SECURED_STORE, Path::new(DEFAULT_STORE_ROOT).join(SECURED_STORE)),
            ],
            system: None,
            password_file: None,
            configset_path: PathBuf::from(DEFAULT_CONFIGSET_PATH),
            partition: DEFAULT_PARTITION.to_string(),
        }
    }
}

impl Settings {
    /// The managed system's name
    pub fn system(&self) -> Result<&str> {
        self.system
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(Error::SystemUndefined)
    }

    /// Look up a store by name
    pub fn store(&self, name: &str) -> Result<&StoreConfig> {
        self.stores
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownStore(name.to_string()))
    }

    /// Vault password file: explicit setting, else inside the secured store
    pub fn password_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.password_file {
            return Some(path.clone());
        }
        self.stores
            .iter()
            .find(|s| s.name == SECURED_STORE)
            .or_else(|| self.stores.last())
            .map(|s| s.path.join(StorePath::VaultPassword.as_str()))
    }

    fn apply(&mut self, layer: SettingsLayer) {
        if let Some(stores) = layer.stores {
            self.stores = stores;
        }
        if layer.system.is_some() {
            self.system = layer.system;
        }
        if layer.password_file.is_some() {
            self.password_file = layer.password_file;
        }
        if let Some(configset_path) = layer.configset_path {
            self.configset_path = configset_path;
        }
        if let Some(partition) = layer.partition {
            self.partition = partition;
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Stores replacing a configured store of the same name, or appended
    pub stores: Vec<StoreConfig>,
    pub system: Option<String>,
    pub password_file: Option<PathBuf>,
    pub configset_path: Option<PathBuf>,
    pub partition: Option<String>,
}

impl SettingsOverrides {
    fn apply(&self, settings: &mut Settings) {
        for store in &self.stores {
            match settings.stores.iter_mut().find(|s| s.name == store.name) {
                Some(existing) => existing.path = store.path.clone(),
                None => settings.stores.push(store.clone()),
            }
        }
        if let Some(system) = &self.system {
            settings.system = Some(system.clone());
        }
        if let Some(password_file) = &self.password_file {
            settings.password_file = Some(password_file.clone());
        }
        if let Some(configset_path) = &self.configset_path {
            settings.configset_path = configset_path.clone();
        }
        if let Some(partition) = &self.partition {
            settings.partition = partition.clone();
        }
    }
}

/// Resolves settings by merging multiple sources
pub struct SettingsResolver {
    /// Directory the site config `etc/driftflow.toml` is resolved against
    base_dir: PathBuf,

    /// Override for the user config directory (used for testing).
    /// When `None`, the platform directory from `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,

    /// File given with `--config`
    explicit: Option<PathBuf>,

    /// Where the default system name is read from
    clustername_file: PathBuf,
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsResolver {
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            global_config_dir_override: None,
            explicit: None,
            clustername_file: PathBuf::from(CLUSTERNAME_FILE),
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn with_clustername_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.clustername_file = path.into();
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("driftflow"))
    }

    /// Resolve the settings by merging all sources
    ///
    /// Missing optional layers are skipped. A missing `--config` file or
    /// invalid TOML in any layer is an error.
    pub fn resolve(&self, overrides: &SettingsOverrides) -> Result<Settings> {
        let mut settings = Settings {
            system: self.read_clustername(),
            ..Settings::default()
        };

        let mut layers = vec![self.base_dir.join("etc").join("driftflow.toml")];
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(global_dir.join("config.toml"));
        }
        for path in layers {
            if path.is_file() {
                tracing::debug!(?path, "Loading settings layer");
                settings.apply(load_layer(&path)?);
            } else {
                tracing::debug!(?path, "No settings layer found, skipping");
            }
        }

        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
            tracing::debug!(?path, "Loading explicit settings");
            settings.apply(load_layer(path)?);
        }

        overrides.apply(&mut settings);
        Ok(settings)
    }

    fn read_clustername(&self) -> Option<String> {
        fs::read_to_string(&self.clustername_file)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn load_layer(path: &Path) -> Result<SettingsLayer> {
    let content = fs::read_to_string(path)?;
    SettingsLayer::parse(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated(temp: &TempDir) -> SettingsResolver {
        SettingsResolver::new()
            .with_base_dir(temp.path())
            .with_global_config_dir(temp.path().join("user"))
            .with_clustername_file(temp.path().join("clustername"))
    }

    #[test]
    fn resolve_returns_defaults_when_no_config_exists() {
        let temp = TempDir::new().unwrap();
        let settings = isolated(&temp).resolve(&SettingsOverrides::default()).unwrap();

        assert_eq!(settings.stores.len(), 2);
        assert_eq!(settings.stores[0].name, "primary");
        assert_eq!(settings.partition, "p0");
        assert!(matches!(settings.system(), Err(Error::SystemUndefined)));
        assert_eq!(
            settings.password_file(),
            Some(PathBuf::from("/var/opt/driftflow/git/secured/ansible_vault/ansible.hash"))
        );
    }

    #[test]
    fn system_comes_from_clustername_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("clustername"), "edison\n").unwrap();
        let settings = isolated(&temp).resolve(&SettingsOverrides::default()).unwrap();
        assert_eq!(settings.system().unwrap(), "edison");
    }

    #[test]
    fn later_layers_win() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("etc")).unwrap();
        fs::create_dir_all(temp.path().join("user")).unwrap();
        fs::write(
            temp.path().join("etc/driftflow.toml"),
            "system = \"site\"\npartition = \"p1\"\n",
        )
        .unwrap();
        fs::write(temp.path().join("user/config.toml"), "system = \"user\"\n").unwrap();

        let settings = isolated(&temp).resolve(&SettingsOverrides::default()).unwrap();
        assert_eq!(settings.system().unwrap(), "user");
        assert_eq!(settings.partition, "p1");

        let overrides = SettingsOverrides {
            system: Some("cli".into()),
            ..Default::default()
        };
        let settings = isolated(&temp).resolve(&overrides).unwrap();
        assert_eq!(settings.system().unwrap(), "cli");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = isolated(&temp)
            .with_config_file(Some(temp.path().join("nope.toml")))
            .resolve(&SettingsOverrides::default());
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn store_override_replaces_by_name() {
        let temp = TempDir::new().unwrap();
        let overrides = SettingsOverrides {
            stores: vec![
                StoreConfig::new("secured", "/tmp/sec"),
                StoreConfig::new("extra", "/tmp/extra"),
            ],
            ..Default::default()
        };
        let settings = isolated(&temp).resolve(&overrides).unwrap();
        let names: Vec<&str> = settings.stores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["primary", "secured", "extra"]);
        assert_eq!(settings.store("secured").unwrap().path, PathBuf::from("/tmp/sec"));
        assert_eq!(
            settings.password_file(),
            Some(PathBuf::from("/tmp/sec/ansible_vault/ansible.hash"))
        );
    }
}
