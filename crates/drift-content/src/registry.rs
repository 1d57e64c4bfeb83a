//! Parser registry for selecting parsers by format

use std::sync::Arc;

use crate::error::Result;
use crate::format::{FormatKind, FormatParser, Parsed};
use crate::parsers::{
    IniParser, JsonParser, KeySpaceValueParser, KeyValueParser, RawParser, VaultParser, YamlParser,
};
use crate::secret::SecretDecryptor;

/// Registry holding one parser per [`FormatKind`].
#[derive(Debug, Default)]
pub struct ParserRegistry {
    raw: RawParser,
    vault: VaultParser,
    yaml: YamlParser,
    json: JsonParser,
    ini: IniParser,
    keyvalue: KeyValueParser,
    keyspacevalue: KeySpaceValueParser,
}

impl ParserRegistry {
    /// Create a registry whose vault parser has no key material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that decrypts vault content with `decryptor`.
    pub fn with_decryptor(decryptor: Arc<dyn SecretDecryptor>) -> Self {
        Self {
            vault: VaultParser::new(Some(decryptor)),
            ..Self::default()
        }
    }

    /// Get the parser for a format.
    pub fn get(&self, format: FormatKind) -> &dyn FormatParser {
        match format {
            FormatKind::Raw => &self.raw,
            FormatKind::AnsibleVaultYaml => &self.vault,
            FormatKind::Yaml => &self.yaml,
            FormatKind::Json => &self.json,
            FormatKind::Ini => &self.ini,
            FormatKind::KeyValue => &self.keyvalue,
            FormatKind::KeySpaceValue => &self.keyspacevalue,
        }
    }

    /// Parse `source` as `format`.
    pub fn parse(&self, format: FormatKind, source: &str) -> Result<Parsed> {
        self.get(format).parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_has_its_parser() {
        let registry = ParserRegistry::new();
        for kind in FormatKind::ALL {
            assert_eq!(registry.get(kind).format(), kind);
        }
    }

    #[test]
    fn test_raw_parse_through_registry() {
        let registry = ParserRegistry::new();
        assert_eq!(
            registry.parse(FormatKind::Raw, "a b").unwrap(),
            Parsed::Tokens(vec!["a".into(), "b".into()])
        );
    }
}
