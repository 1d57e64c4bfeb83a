use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use drift_content::{DecryptError, SecretDecryptor};

use super::ProcessRunner;

/// Decrypts Ansible Vault text with the `ansible-vault` command
pub struct AnsibleVaultCommand {
    runner: Arc<dyn ProcessRunner>,
    password_file: PathBuf,
}

impl AnsibleVaultCommand {
    pub fn new(runner: Arc<dyn ProcessRunner>, password_file: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            password_file: password_file.into(),
        }
    }
}

impl SecretDecryptor for AnsibleVaultCommand {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        if !self.password_file.is_file() {
            return Err(DecryptError::NoKeyMaterial);
        }

        let mut encrypted =
            tempfile::NamedTempFile::new().map_err(|e| DecryptError::Failed(e.to_string()))?;
        encrypted
            .write_all(ciphertext.as_bytes())
            .and_then(|()| encrypted.flush())
            .map_err(|e| DecryptError::Failed(e.to_string()))?;

        let argv = vec![
            "ansible-vault".to_string(),
            "view".to_string(),
            "--vault-password-file".to_string(),
            self.password_file.to_string_lossy().to_string(),
            encrypted.path().to_string_lossy().to_string(),
        ];
        let output = self
            .runner
            .run(&argv)
            .map_err(|e| DecryptError::Failed(e.to_string()))?;
        if !output.success() {
            return Err(DecryptError::Failed(output.stderr.trim().to_string()));
        }
        Ok(output.stdout)
    }
}
