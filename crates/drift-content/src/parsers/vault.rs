//! Ansible-vault encrypted YAML

use std::sync::Arc;

use super::YamlParser;
use crate::error::Result;
use crate::format::{FormatKind, FormatParser, Parsed};
use crate::secret::{DecryptError, SecretDecryptor};

/// Decrypts vault text and parses the plaintext as YAML.
///
/// Without a decryptor, or when decryption fails, the content is reported
/// as [`Parsed::Skipped`] instead of an error.
#[derive(Default)]
pub struct VaultParser {
    decryptor: Option<Arc<dyn SecretDecryptor>>,
    yaml: YamlParser,
}

impl VaultParser {
    pub fn new(decryptor: Option<Arc<dyn SecretDecryptor>>) -> Self {
        Self {
            decryptor,
            yaml: YamlParser::new(),
        }
    }
}

impl std::fmt::Debug for VaultParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultParser")
            .field("has_decryptor", &self.decryptor.is_some())
            .finish()
    }
}

impl FormatParser for VaultParser {
    fn format(&self) -> FormatKind {
        FormatKind::AnsibleVaultYaml
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        let plaintext = match self.decryptor.as_ref() {
            Some(decryptor) => decryptor.decrypt(source),
            None => Err(DecryptError::NoKeyMaterial),
        };

        match plaintext {
            Ok(text) => self.yaml.parse(&text),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping vault content");
                Ok(Parsed::Skipped(format!("could not decrypt: {e}")))
            }
        }
    }
}
