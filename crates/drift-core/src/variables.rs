//! Template variables
//!
//! Variables live next to desired objects as `<system>.yaml` and the
//! vault-encrypted `<system>_secrets.yaml` in `vars` search directories.
//! Three levels are layered for every category: global
//! (`vars/vars`), target (`<maintype>/vars`) and category
//! (`<maintype>/<subtype>_<category>_vars`). A lower level only fills keys
//! its own files leave unset.

use std::path::Path;
use std::sync::Arc;

use drift_content::SecretDecryptor;
use drift_content::parsers::YamlParser;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::enumerate::search_paths;
use crate::target::{Category, Target};
use crate::{Error, Result};

/// A flat variable namespace
pub type Variables = serde_json::Map<String, Value>;

/// Reads and layers variable files for one system
pub struct VariableResolver<'a> {
    stores: &'a [StoreConfig],
    system: &'a str,
    decryptor: Option<Arc<dyn SecretDecryptor>>,
    yaml: YamlParser,
}

impl<'a> VariableResolver<'a> {
    pub fn new(
        stores: &'a [StoreConfig],
        system: &'a str,
        decryptor: Option<Arc<dyn SecretDecryptor>>,
    ) -> Self {
        Self {
            stores,
            system,
            decryptor,
            yaml: YamlParser::new(),
        }
    }

    /// Merge the variable files of every search directory of an object type
    ///
    /// Later directories override earlier ones; keys of `parent` fill in
    /// only what the files leave unset.
    pub fn read_vars(
        &self,
        maintype: &str,
        objtype: &str,
        subtype: Option<&str>,
        parent: Option<&Variables>,
    ) -> Result<Variables> {
        let mut vars = Variables::new();

        for dir in search_paths(self.stores, self.system, maintype, objtype, subtype) {
            let plain = dir.path.join(format!("{}.yaml", self.system));
            if plain.is_file() {
                let text = std::fs::read_to_string(&plain)?;
                vars.extend(self.parse_vars(&plain, &text)?);
            }

            let secrets = dir.path.join(format!("{}_secrets.yaml", self.system));
            if secrets.is_file()
                && let Some(secret_vars) = self.read_secrets(&secrets)?
            {
                vars.extend(secret_vars);
            }
        }

        if let Some(parent) = parent {
            for (key, value) in parent {
                vars.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Ok(vars)
    }

    /// Variables visible to the templates of one category
    pub fn vars_for(&self, target: &Target, category: &Category) -> Result<Variables> {
        let global = self.read_vars("vars", "vars", None, None)?;
        let target_vars = self.read_vars(&target.maintype, "vars", None, Some(&global))?;
        match &category.vars_objtype {
            Some(objtype) => self.read_vars(
                &category.maintype,
                objtype,
                category.subtype.as_deref(),
                Some(&target_vars),
            ),
            None => Ok(target_vars),
        }
    }

    fn read_secrets(&self, path: &Path) -> Result<Option<Variables>> {
        let Some(decryptor) = &self.decryptor else {
            tracing::warn!(?path, "Cannot read secrets, no usable vault password");
            return Ok(None);
        };
        let ciphertext = std::fs::read_to_string(path)?;
        match decryptor.decrypt(&ciphertext) {
            Ok(text) => self.parse_vars(path, &text).map(Some),
            Err(e) => {
                tracing::warn!(?path, error = %e, "Cannot decrypt variables, skipping");
                Ok(None)
            }
        }
    }

    fn parse_vars(&self, path: &Path, text: &str) -> Result<Variables> {
        let value = self.yaml.parse_value(text).map_err(|e| Error::Variables {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Variables::new()),
            other => Err(Error::Variables {
                path: path.to_path_buf(),
                message: format!("expected a mapping, found {other}"),
            }),
        }
    }
}
