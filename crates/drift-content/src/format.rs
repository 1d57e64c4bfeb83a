//! Format classification and the parser trait

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialization formats a managed object can be compared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Raw,
    #[serde(rename = "ansiblevault")]
    AnsibleVaultYaml,
    Yaml,
    Json,
    Ini,
    #[serde(rename = "keyvalue")]
    KeyValue,
    #[serde(rename = "keyspacevalue")]
    KeySpaceValue,
}

impl FormatKind {
    /// Every known format, in registry order
    pub const ALL: [FormatKind; 7] = [
        Self::Raw,
        Self::AnsibleVaultYaml,
        Self::Yaml,
        Self::Json,
        Self::Ini,
        Self::KeyValue,
        Self::KeySpaceValue,
    ];

    /// Parse an explicit format hint as written in a manifest (case-insensitive)
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "ansiblevault" => Some(Self::AnsibleVaultYaml),
            "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "ini" => Some(Self::Ini),
            "keyvalue" => Some(Self::KeyValue),
            "keyspacevalue" => Some(Self::KeySpaceValue),
            _ => None,
        }
    }

    /// Detect format from an object name's extension
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "ini" => Some(Self::Ini),
            _ => None,
        }
    }

    /// Manifest spelling of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::AnsibleVaultYaml => "ansiblevault",
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Ini => "ini",
            Self::KeyValue => "keyvalue",
            Self::KeySpaceValue => "keyspacevalue",
        }
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Known(FormatKind),
    /// An explicit hint named no known format; callers treat this as fatal
    UnrecognizedHint(String),
}

/// Decide which format an object is compared as.
///
/// First match wins: explicit hint, an object named exactly
/// `<system>_secrets.yaml` (vault), any other `*_secrets.yaml` (raw), the
/// file extension, then raw. Nested secrets files are never decrypted.
pub fn classify(name: &str, format_hint: Option<&str>, system: &str) -> Classification {
    if let Some(hint) = format_hint {
        return match FormatKind::from_hint(hint) {
            Some(kind) => Classification::Known(kind),
            None => Classification::UnrecognizedHint(hint.to_string()),
        };
    }

    if name == format!("{system}_secrets.yaml") {
        return Classification::Known(FormatKind::AnsibleVaultYaml);
    }
    if name.ends_with("_secrets.yaml") {
        return Classification::Known(FormatKind::Raw);
    }

    let file_name = name.rsplit('/').next().unwrap_or(name);
    Classification::Known(FormatKind::from_name(file_name).unwrap_or(FormatKind::Raw))
}

/// Comparable form of one side of an object
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Map / sequence / scalar tree
    Structured(Value),
    /// Whitespace-separated tokens of raw text
    Tokens(Vec<String>),
    /// The content could not be made comparable; carries the reason
    Skipped(String),
}

/// Trait for format-specific parsers
pub trait FormatParser {
    /// Format identifier
    fn format(&self) -> FormatKind;

    /// Parse source text into its comparable form
    fn parse(&self, source: &str) -> Result<Parsed>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sys_secrets.yaml", None, Classification::Known(FormatKind::AnsibleVaultYaml))]
    #[case("other_secrets.yaml", None, Classification::Known(FormatKind::Raw))]
    #[case("group_vars/sys_secrets.yaml", None, Classification::Known(FormatKind::Raw))]
    #[case("group_vars/all/sys_secrets.yaml", None, Classification::Known(FormatKind::Raw))]
    #[case("app.yaml", None, Classification::Known(FormatKind::Yaml))]
    #[case("app.yml", None, Classification::Known(FormatKind::Yaml))]
    #[case("app.json", None, Classification::Known(FormatKind::Json))]
    #[case("app.ini", None, Classification::Known(FormatKind::Ini))]
    #[case("slurm.conf", None, Classification::Known(FormatKind::Raw))]
    #[case("Makefile", None, Classification::Known(FormatKind::Raw))]
    #[case("slurm.conf", Some("KeyValue"), Classification::Known(FormatKind::KeyValue))]
    #[case("app.yaml", Some("raw"), Classification::Known(FormatKind::Raw))]
    #[case("sys_secrets.yaml", Some("yaml"), Classification::Known(FormatKind::Yaml))]
    fn test_classify(
        #[case] name: &str,
        #[case] hint: Option<&str>,
        #[case] expected: Classification,
    ) {
        assert_eq!(classify(name, hint, "sys"), expected);
    }

    #[test]
    fn test_unknown_hint_is_reported_not_guessed() {
        assert_eq!(
            classify("app.yaml", Some("xml"), "sys"),
            Classification::UnrecognizedHint("xml".into())
        );
    }

    #[test]
    fn test_hint_roundtrip() {
        for kind in FormatKind::ALL {
            assert_eq!(FormatKind::from_hint(kind.as_str()), Some(kind));
        }
    }
}
