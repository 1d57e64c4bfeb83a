//! Error types for drift-core

use std::path::PathBuf;

/// Result type for drift-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drift-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Explicitly requested settings file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A settings layer could not be parsed
    #[error("Invalid settings in {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    /// No system name was configured or discovered
    #[error("System undefined: set `system` in the settings or pass --system")]
    SystemUndefined,

    /// No configured store has the requested name
    #[error("Unknown store: {0}")]
    UnknownStore(String),

    /// None of the desired-side search directories of a category exist
    #[error("No desired-state directory found for category {category} (searched {searched:?})")]
    NoSearchPath {
        category: String,
        searched: Vec<PathBuf>,
    },

    /// The observed-side root of a category does not exist
    #[error("Observed location for category {category} does not exist: {path}")]
    ObservedRootMissing { category: String, path: PathBuf },

    /// A manifest named a format that no parser handles
    #[error("Unknown format {hint:?} declared for {object}")]
    UnknownFormat { object: String, hint: String },

    /// A manifest attribute has the wrong shape
    #[error("Invalid attribute {key} for {object}: {message}")]
    InvalidAttribute {
        object: String,
        key: String,
        message: String,
    },

    /// Variables file could not be parsed
    #[error("Invalid variables in {path}: {message}")]
    Variables { path: PathBuf, message: String },

    /// Template rendering failed
    #[error("Failed to render {name}: {message}")]
    Render { name: String, message: String },

    /// Refused to create over an existing observed location
    #[error("Refusing to create: {path} already exists")]
    ObservedExists { path: PathBuf },

    /// The target has no provisioning step
    #[error("Target {target} cannot be created")]
    CreateUnsupported { target: String },

    /// Operation is not legal in the current state
    #[error("Cannot {operation} from state {from}")]
    InvalidTransition { from: String, operation: String },

    /// External command could not be started
    #[error("Failed to run {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// External command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from drift-fs
    #[error(transparent)]
    Fs(#[from] drift_fs::Error),

    /// Content error from drift-content
    #[error(transparent)]
    Content(#[from] drift_content::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
