//! Per-object comparison: read, render, classify, parse, diff

use std::fs;
use std::path::Path;

use drift_content::worksheet::expand_dotted_keys;
use drift_content::{
    Classification, DiffPath, DiffRecord, FormatKind, Parsed, ParserRegistry, classify, diff,
    diff_tokens,
};
use serde_json::Value;

use crate::collab::TemplateRenderer;
use crate::object::ManagedObject;
use crate::target::Category;
use crate::{Error, Result};

/// Result of comparing one object
#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    /// Differences found, possibly none
    Compared(Vec<DiffRecord>),
    /// The object could not be compared; carries the reason
    Skipped(String),
}

/// Compares desired objects against their observed copies
pub struct ObjectComparer<'a> {
    registry: &'a ParserRegistry,
    renderer: &'a dyn TemplateRenderer,
    system: &'a str,
}

impl<'a> ObjectComparer<'a> {
    pub fn new(
        registry: &'a ParserRegistry,
        renderer: &'a dyn TemplateRenderer,
        system: &'a str,
    ) -> Self {
        Self {
            registry,
            renderer,
            system,
        }
    }

    /// Resolve the format of an object
    ///
    /// # Errors
    ///
    /// An explicit format hint naming no known format is a configuration
    /// error and aborts the run.
    pub fn format_of(&self, object: &ManagedObject) -> Result<FormatKind> {
        match classify(&object.name, object.format_hint.as_deref(), self.system) {
            Classification::Known(kind) => Ok(kind),
            Classification::UnrecognizedHint(hint) => Err(Error::UnknownFormat {
                object: object.name.clone(),
                hint,
            }),
        }
    }

    /// The text the observed copy should contain
    pub fn desired_text(&self, object: &ManagedObject, category: &Category, vars: &Value) -> Result<String> {
        let source = fs::read_to_string(&object.desired_source_path)
            .map_err(|e| drift_fs::Error::io(&object.desired_source_path, e))?;
        if !category.templated {
            return Ok(source);
        }
        self.renderer.render(&object.name, &source, vars)
    }

    /// Compare one object with the file at `observed_path`
    pub fn compare(
        &self,
        object: &ManagedObject,
        observed_path: &Path,
        category: &Category,
        vars: &Value,
    ) -> Result<CompareOutcome> {
        let format = self.format_of(object)?;

        let desired = match self.desired_text(object, category, vars) {
            Ok(text) => text,
            Err(e) => return Ok(self.skip(object, format!("could not read desired copy: {e}"))),
        };
        let observed = match fs::read_to_string(observed_path) {
            Ok(text) => text,
            Err(e) => return Ok(self.skip(object, format!("could not read observed copy: {e}"))),
        };

        let desired = match self.registry.parse(format, &desired) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(self.skip(object, format!("could not parse desired copy: {e}"))),
        };
        let observed = match self.registry.parse(format, &observed) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(self.skip(object, format!("could not parse observed copy: {e}"))),
        };

        let records = match (desired, observed) {
            (Parsed::Structured(desired), Parsed::Structured(observed)) => {
                let (desired, observed) = if category.worksheet {
                    (expand_dotted_keys(&desired), expand_dotted_keys(&observed))
                } else {
                    (desired, observed)
                };
                diff(&desired, &observed, &DiffPath::root(), &object.ignore_keys)
            }
            (Parsed::Tokens(desired), Parsed::Tokens(observed)) => diff_tokens(&desired, &observed),
            (Parsed::Skipped(reason), _) | (_, Parsed::Skipped(reason)) => {
                return Ok(self.skip(object, reason));
            }
            _ => return Ok(self.skip(object, format!("{format} sides are not comparable"))),
        };

        tracing::debug!(object = %object.name, %format, differences = records.len(), "Compared object");
        Ok(CompareOutcome::Compared(records))
    }

    fn skip(&self, object: &ManagedObject, reason: String) -> CompareOutcome {
        tracing::warn!(object = %object.name, %reason, "Could not compare");
        CompareOutcome::Skipped(reason)
    }
}
