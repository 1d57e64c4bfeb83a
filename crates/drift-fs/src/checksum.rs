//! Content checksums
//!
//! An observed file is rewritten only when the digest of the rendered
//! desired text differs from the digest of what is on disk.

use sha2::{Digest, Sha256};
use std::path::Path;

const PREFIX: &str = "sha256:";

/// `sha256:<hex>` digest of `content`
pub fn checksum(content: impl AsRef<[u8]>) -> String {
    format!("{PREFIX}{:x}", Sha256::digest(content.as_ref()))
}

/// Digest of the file at `path`
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    std::fs::read(path).map(checksum)
}

/// Whether writing `content` to `path` would change the file.
///
/// A missing or unreadable file always counts as differing.
pub fn content_differs(path: &Path, content: &str) -> bool {
    file_checksum(path).map_or(true, |existing| existing != checksum(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_known_value() {
        assert_eq!(
            checksum("hello world"),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_checksum_matches_text_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motd");
        std::fs::write(&path, "welcome\n").unwrap();
        assert_eq!(file_checksum(&path).unwrap(), checksum("welcome\n"));
    }

    #[test]
    fn content_differs_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(content_differs(&dir.path().join("absent"), "x"));
    }

    #[test]
    fn content_differs_detects_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.conf");
        std::fs::write(&path, "port=1\n").unwrap();

        assert!(!content_differs(&path, "port=1\n"));
        assert!(content_differs(&path, "port=2\n"));
    }
}
