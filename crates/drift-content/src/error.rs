//! Error types for drift-content

/// Result type for drift-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drift-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    #[error("Failed to parse {format} content at line {line}: {message}")]
    LineError {
        format: String,
        line: usize,
        message: String,
    },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn line(format: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::LineError {
            format: format.into(),
            line,
            message: message.into(),
        }
    }
}
