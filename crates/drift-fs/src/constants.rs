//! Well-known file names inside desired-state stores.

/// Fixed paths driftflow looks for inside stores and search directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePath {
    /// Per-directory manifest holding object attributes
    Manifest,
    /// Vault password file, relative to the secured store
    VaultPassword,
}

impl StorePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => ".driftflow.manifest.yaml",
            Self::VaultPassword => "ansible_vault/ansible.hash",
        }
    }
}
