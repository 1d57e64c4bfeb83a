//! Secret decryption seam used by the vault parser

/// Why a secret could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error("no key material available")]
    NoKeyMaterial,

    #[error("decryption failed: {0}")]
    Failed(String),
}

/// Decrypts vault-encrypted text
pub trait SecretDecryptor {
    fn decrypt(&self, ciphertext: &str) -> std::result::Result<String, DecryptError>;
}
