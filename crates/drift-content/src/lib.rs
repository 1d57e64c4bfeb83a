//! Content classification, parsing and structural diffing for driftflow
//!
//! Turns the text of a configuration object into a comparable shape
//! (a `serde_json::Value` tree or a token list) and reports the
//! differences between a desired and an observed copy.

pub mod diff;
pub mod error;
pub mod format;
pub mod parsers;
pub mod registry;
pub mod secret;
pub mod worksheet;

pub use diff::{DiffKind, DiffPath, DiffRecord, DiffSide, PathSegment, diff, diff_tokens};
pub use error::{Error, Result};
pub use format::{Classification, FormatKind, FormatParser, Parsed, classify};
pub use registry::ParserRegistry;
pub use secret::{DecryptError, SecretDecryptor};
