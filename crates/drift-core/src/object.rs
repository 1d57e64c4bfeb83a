//! Typed view of one managed configuration object

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use drift_fs::{AttributeRequest, parse_mode};
use serde_yaml::Value;

use crate::manifest::Attributes;
use crate::{Error, Result};

/// One configuration artifact known to a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    /// Logical relative path, unique within a category
    pub name: String,
    pub desired_source_path: PathBuf,
    pub observed_path: Option<PathBuf>,
    /// Explicit format name from the manifest
    pub format_hint: Option<String>,
    pub ignore_keys: BTreeSet<String>,
    pub mode: Option<u32>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub is_directory: bool,
    /// Name of the store the desired copy came from
    pub store: Option<String>,
    /// Manifest keys with no dedicated field
    pub extensions: BTreeMap<String, String>,
}

impl ManagedObject {
    pub fn new(name: impl Into<String>, desired_source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            desired_source_path: desired_source_path.into(),
            observed_path: None,
            format_hint: None,
            ignore_keys: BTreeSet::new(),
            mode: None,
            owner: None,
            group: None,
            is_directory: false,
            store: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Apply manifest attributes on top of the current values
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAttribute`] when a recognized key has a value
    /// of the wrong shape.
    pub fn apply_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        for (key, value) in attributes {
            match key.as_str() {
                "format" | "formattype" => self.format_hint = Some(self.scalar(key, value)?),
                "ignore_keys" => self.ignore_keys = self.string_list(key, value)?,
                "mode" => self.mode = Some(self.mode_value(key, value)?),
                "owner" => self.owner = Some(self.scalar(key, value)?),
                "group" => self.group = Some(self.scalar(key, value)?),
                "observed_path" | "smwpath" => {
                    self.observed_path = Some(PathBuf::from(self.scalar(key, value)?))
                }
                "store" | "repo" => self.store = Some(self.scalar(key, value)?),
                "fstype" => {
                    self.is_directory = match self.scalar(key, value)?.as_str() {
                        "file" => false,
                        "directory" => true,
                        other => return Err(self.invalid(key, format!("unknown fstype {other:?}"))),
                    }
                }
                _ => match scalar_text(value) {
                    Some(text) => {
                        self.extensions.insert(key.clone(), text);
                    }
                    None => tracing::debug!(object = %self.name, key, "Ignoring non-scalar attribute"),
                },
            }
        }
        Ok(())
    }

    /// Attribute map suitable for a manifest entry
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        let mut put = |key: &str, value: Value| {
            attributes.insert(key.to_string(), value);
        };
        if let Some(format) = &self.format_hint {
            put("format", Value::from(format.as_str()));
        }
        if !self.ignore_keys.is_empty() {
            put(
                "ignore_keys",
                Value::Sequence(self.ignore_keys.iter().map(|k| Value::from(k.as_str())).collect()),
            );
        }
        if let Some(mode) = self.mode {
            put("mode", Value::from(format!("{mode:04o}")));
        }
        if let Some(owner) = &self.owner {
            put("owner", Value::from(owner.as_str()));
        }
        if let Some(group) = &self.group {
            put("group", Value::from(group.as_str()));
        }
        if let Some(path) = &self.observed_path {
            put("observed_path", Value::from(path.to_string_lossy().as_ref()));
        }
        if self.is_directory {
            put("fstype", Value::from("directory"));
        }
        if let Some(store) = &self.store {
            put("store", Value::from(store.as_str()));
        }
        for (key, value) in &self.extensions {
            put(key, Value::from(value.as_str()));
        }
        attributes
    }

    /// Owner, group and mode this object asks for
    pub fn attribute_request(&self) -> AttributeRequest {
        AttributeRequest {
            owner: self.owner.clone(),
            group: self.group.clone(),
            mode: self.mode,
        }
    }

    pub fn declares_attributes(&self) -> bool {
        !self.attribute_request().is_empty()
    }

    fn invalid(&self, key: &str, message: impl Into<String>) -> Error {
        Error::InvalidAttribute {
            object: self.name.clone(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    fn scalar(&self, key: &str, value: &Value) -> Result<String> {
        scalar_text(value).ok_or_else(|| self.invalid(key, "expected a scalar"))
    }

    fn string_list(&self, key: &str, value: &Value) -> Result<BTreeSet<String>> {
        match value {
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.scalar(key, item))
                .collect(),
            Value::Null => Ok(BTreeSet::new()),
            _ => Err(self.invalid(key, "expected a list of strings")),
        }
    }

    // Integers are raw permission bits, strings are octal
    fn mode_value(&self, key: &str, value: &Value) -> Result<u32> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|bits| u32::try_from(bits).ok())
                .filter(|bits| *bits <= drift_fs::attributes::MODE_MASK)
                .ok_or_else(|| self.invalid(key, format!("mode {n} out of range"))),
            Value::String(s) => parse_mode(s).map_err(|e| self.invalid(key, e.to_string())),
            _ => Err(self.invalid(key, "expected an octal string or integer")),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
