//! Filesystem primitives for driftflow
//!
//! Provides object-name normalization, atomic I/O, content checksums,
//! format-agnostic config loading and POSIX file attribute access.

pub mod attributes;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use attributes::{AttributeAccessor, AttributeRequest, FileAttributes, PosixAttributes, parse_mode};
pub use config::ConfigStore;
pub use constants::StorePath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
