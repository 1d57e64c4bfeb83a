//! Error types for drift-fs

use std::path::PathBuf;

/// Result type for drift-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drift-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Unknown user: {name}")]
    UnknownUser { name: String },

    #[error("Unknown group: {name}")]
    UnknownGroup { name: String },

    #[error("Invalid file mode: {value}")]
    InvalidMode { value: String },

    #[error("Failed to look up {what}: {source}")]
    Lookup {
        what: String,
        #[source]
        source: nix::errno::Errno,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
