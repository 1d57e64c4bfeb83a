//! Reconciliation targets
//!
//! A target is an ordered list of categories plus the commands that
//! provision and validate its observed container. Three targets are built
//! in: `hss`, `imps` and a named config set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_yaml::Value;

use crate::config::Settings;
use crate::enumerate::{NameFilter, ObservedSource};
use crate::manifest::Attributes;

/// Default config-set type
pub const DEFAULT_CFGSET_TYPE: &str = "cle";

/// A group of objects enumerated, compared and updated together
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub maintype: String,
    pub objtype: String,
    pub subtype: Option<String>,
    pub observed: ObservedSource,
    /// Desired sources are templates rendered before comparison
    pub templated: bool,
    /// Dotted keys are expanded into nested maps before diffing
    pub worksheet: bool,
    /// Object type of the category-level variables, if any
    pub vars_objtype: Option<String>,
    /// Attributes overlaid on enumerated objects of the same name
    pub defaults: BTreeMap<String, Attributes>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        maintype: impl Into<String>,
        objtype: impl Into<String>,
        observed: ObservedSource,
    ) -> Self {
        Self {
            name: name.into(),
            maintype: maintype.into(),
            objtype: objtype.into(),
            subtype: None,
            observed,
            templated: false,
            worksheet: false,
            vars_objtype: None,
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn templated(mut self, vars_objtype: Option<&str>) -> Self {
        self.templated = true;
        self.vars_objtype = vars_objtype.map(str::to_string);
        self
    }

    pub fn worksheet(mut self) -> Self {
        self.worksheet = true;
        self
    }

    pub fn with_defaults(mut self, defaults: BTreeMap<String, Attributes>) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Something that can be verified, created and updated
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    /// Top-level directory of the target in each store
    pub maintype: String,
    pub categories: Vec<Category>,
    /// Observed directory that `create` provisions
    pub container: Option<PathBuf>,
    pub provision: Option<Vec<String>>,
    pub validate: Option<Vec<String>>,
}

/// A live file managed by a built-in target
#[derive(Debug, Clone, Copy)]
pub struct BuiltinObject {
    pub name: &'static str,
    pub path: &'static str,
    pub format: &'static str,
    pub mode: u32,
    pub owner: &'static str,
    pub group: &'static str,
    pub store: &'static str,
}

impl BuiltinObject {
    pub fn attributes(&self) -> Attributes {
        [
            ("observed_path", Value::from(self.path)),
            ("format", Value::from(self.format)),
            ("mode", Value::from(format!("{:04o}", self.mode))),
            ("owner", Value::from(self.owner)),
            ("group", Value::from(self.group)),
            ("store", Value::from(self.store)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

macro_rules! hss {
    ($name:expr, $file:literal, $format:expr, $mode:expr, $store:expr) => {
        BuiltinObject {
            name: $name,
            path: concat!("/opt/cray/hss/default/etc/", $file),
            format: $format,
            mode: $mode,
            owner: "crayadm",
            group: "crayadm",
            store: $store,
        }
    };
}

/// Hardware supervisory system configuration
pub const MANAGED_HSS: &[BuiltinObject] = &[
    hss!("blade_json.sedc", "blade_json.sedc", "json", 0o644, "primary"),
    hss!("cab_json.sedc", "cab_json.sedc", "json", 0o644, "primary"),
    hss!("bm.ini", "bm.ini", "keyspacevalue", 0o644, "primary"),
    hss!("sm.ini", "sm.ini", "keyvalue", 0o644, "primary"),
    hss!("xtbounce.ini", "xtbounce.ini", "ini", 0o644, "primary"),
    hss!("xtcli.ini", "xtcli.ini", "keyvalue", 0o644, "primary"),
    hss!("xtdiscover.ini", "xtdiscover.ini", "ini", 0o644, "primary"),
    hss!("xtnlrd.ini", "xtnlrd.ini", "ini", 0o644, "primary"),
    hss!("xtpcimon.ini", "xtpcimon.ini", "ini", 0o644, "primary"),
    hss!("xtpmd.ini", "xtpmd.ini", "ini", 0o644, "primary"),
    hss!("xtpmd_plugins.ini", "xtpmd_plugins.ini", "ini", 0o644, "primary"),
    hss!("xtpowerd.ini", "xtpowerd.ini", "ini", 0o644, "primary"),
    hss!("xtremoted.ini", "xtremoted/xtremoted.ini", "ini", 0o600, "secured"),
    hss!("xtremoted.key", "xtremoted/xtremoted.key", "raw", 0o400, "secured"),
    hss!("xtremoted_ssl_ca.crt", "xtremoted/ssl_ca.crt", "raw", 0o444, "secured"),
    hss!("xtremoted.crt", "xtremoted/xtremoted.crt", "raw", 0o444, "secured"),
    hss!("xtremoted_rules.ini", "xtremoted/rules.ini", "ini", 0o644, "secured"),
];

/// Image management service configuration
pub const MANAGED_IMPS: &[BuiltinObject] = &[
    BuiltinObject {
        name: "imps.json",
        path: "/etc/opt/cray/imps/imps.json",
        format: "json",
        mode: 0o755,
        owner: "root",
        group: "root",
        store: "primary",
    },
    BuiltinObject {
        name: "image_recipes.local.json",
        path: "/etc/opt/cray/imps/image_recipes.d/image_recipes.local.json",
        format: "json",
        mode: 0o644,
        owner: "root",
        group: "root",
        store: "primary",
    },
    BuiltinObject {
        name: "package_collections.local.json",
        path: "/etc/opt/cray/imps/package_collections.d/package_collections.local.json",
        format: "json",
        mode: 0o644,
        owner: "root",
        group: "root",
        store: "primary",
    },
];

/// Config-set files whose permissions are tightened
const MANAGED_CFGSET_CONFIG: &[(&str, u32)] = &[
    ("cray_lmt_config.yaml", 0o600),
    ("cray_local_users_config.yaml", 0o600),
];

fn builtin_defaults(objects: &[BuiltinObject]) -> BTreeMap<String, Attributes> {
    objects
        .iter()
        .map(|object| (object.name.to_string(), object.attributes()))
        .collect()
}

impl Target {
    /// A target whose objects each declare their own live path
    pub fn manifest_target(name: &str, objects: &[BuiltinObject]) -> Self {
        Self {
            name: name.to_string(),
            maintype: name.to_string(),
            categories: vec![
                Category::new(name, name, name, ObservedSource::Manifest)
                    .templated(None)
                    .with_defaults(builtin_defaults(objects)),
            ],
            container: None,
            provision: None,
            validate: None,
        }
    }

    pub fn hss() -> Self {
        Self::manifest_target("hss", MANAGED_HSS)
    }

    pub fn imps() -> Self {
        Self::manifest_target("imps", MANAGED_IMPS)
    }

    /// A config set of type `ctype` named `name` under the configured root
    pub fn cfgset(settings: &Settings, ctype: &str, name: &str) -> Self {
        let container = settings.configset_path.join(name);
        let config_defaults = MANAGED_CFGSET_CONFIG
            .iter()
            .map(|(file, mode)| {
                let attributes: Attributes =
                    [("mode".to_string(), Value::from(format!("{mode:04o}")))].into();
                (file.to_string(), attributes)
            })
            .collect();

        let categories = vec![
            Category::new(
                "worksheets",
                "imps",
                "worksheets",
                ObservedSource::List {
                    root: container.join("worksheets"),
                    filter: NameFilter::Suffix("worksheet.yaml"),
                },
            )
            .templated(Some("worksheet_vars"))
            .worksheet(),
            Category::new(
                "config",
                "imps",
                "config",
                ObservedSource::List {
                    root: container.join("config"),
                    filter: NameFilter::ConfigFiles,
                },
            )
            .templated(Some("config_vars"))
            .with_defaults(config_defaults),
            Category::new(
                "dist",
                "imps",
                "dist",
                ObservedSource::List {
                    root: container.join("dist"),
                    filter: NameFilter::Preload,
                },
            )
            .templated(Some("dist_vars")),
            Category::new("ansible", "imps", "ansible", ObservedSource::Walk(container.join("ansible"))),
            Category::new("files", "imps", "files", ObservedSource::Walk(container.join("files"))),
        ]
        .into_iter()
        .map(|category| category.with_subtype(ctype))
        .collect();

        let argv = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let type_flag = format!("--type={ctype}");

        Self {
            name: format!("cfgset {name}"),
            maintype: "imps".to_string(),
            categories,
            container: Some(container),
            provision: Some(argv(&[
                "cfgset",
                "create",
                "--mode=prepare",
                &type_flag,
                "--no-scripts",
                name,
            ])),
            validate: Some(argv(&["cfgset", "validate", name])),
        }
    }
}
