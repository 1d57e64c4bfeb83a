//! Normalized path handling for object names and store locations

use std::fmt;
use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Object names are stored as normalized paths relative to the search
/// directory they were found in, so the same logical object has the same
/// name in every store layer and on the observed side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and collapses repeated
    /// separators.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy();
        let mut inner = String::with_capacity(raw.len());
        for ch in raw.chars().map(|c| if c == '\\' { '/' } else { c }) {
            if !(ch == '/' && inner.ends_with('/')) {
                inner.push(ch);
            }
        }
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Path for I/O calls
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append an object name; a leading slash on `segment` is ignored
    pub fn join(&self, segment: &str) -> Self {
        let segment = Self::new(segment);
        let segment = segment.inner.trim_start_matches('/');
        match self.inner.as_str() {
            "" => Self::new(segment),
            base if base.ends_with('/') => Self::new(format!("{base}{segment}")),
            base => Self::new(format!("{base}/{segment}")),
        }
    }

    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Last non-empty component
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Express `path` relative to `base`, if it lies underneath it.
    ///
    /// Returns `None` for `base` itself or for paths outside of it.
    pub fn relative_to(path: impl AsRef<Path>, base: impl AsRef<Path>) -> Option<Self> {
        let relative = path.as_ref().strip_prefix(base.as_ref()).ok()?;
        let normalized = Self::new(relative);
        if normalized.inner.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }

    /// Extension of the file name; dotfiles have none
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
