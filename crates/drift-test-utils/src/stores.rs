//! [`TestStores`] builder for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary layout with two desired-state stores and an observed host tree:
///
/// ```text
/// <root>/primary/...   desired store "primary"
/// <root>/secured/...   desired store "secured"
/// <root>/live/...      observed side
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use drift_test_utils::TestStores;
///
/// let stores = TestStores::new();
/// stores.write_desired("primary", "app/app/app.yaml", "port: 8080\n");
/// stores.write_live("etc/app.yaml", "port: 8081\n");
/// stores.assert_file_contains("live/etc/app.yaml", "8081");
/// ```
pub struct TestStores {
    temp_dir: TempDir,
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStores {
    /// Create the store and host directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["primary", "secured", "live"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store_path(&self, store: &str) -> PathBuf {
        self.root().join(store)
    }

    /// Root of the observed host tree.
    pub fn live_path(&self) -> PathBuf {
        self.root().join("live")
    }

    /// Write a desired object at `rel` inside `store`, creating parents.
    pub fn write_desired(&self, store: &str, rel: &str, content: &str) -> PathBuf {
        write(&self.store_path(store).join(rel), content)
    }

    /// Write the manifest of directory `dir` (relative to `store`).
    pub fn write_manifest(&self, store: &str, dir: &str, yaml: &str) -> PathBuf {
        write(
            &self.store_path(store).join(dir).join(".driftflow.manifest.yaml"),
            yaml,
        )
    }

    /// Write an observed file at `rel` inside the host tree.
    pub fn write_live(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.live_path().join(rel), content)
    }

    pub fn read_live(&self, rel: &str) -> String {
        let path = self.live_path().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Settings TOML pointing both stores and the config-set root into the
    /// fixture.
    pub fn settings_toml(&self, system: &str) -> String {
        format!(
            "system = \"{system}\"\nconfigset_path = \"{sets}\"\n\n\
             [[stores]]\nname = \"primary\"\npath = \"{primary}\"\n\n\
             [[stores]]\nname = \"secured\"\npath = \"{secured}\"\n",
            sets = self.live_path().join("sets").display(),
            primary = self.store_path("primary").display(),
            secured = self.store_path("secured").display(),
        )
    }

    /// Write [`Self::settings_toml`] to `<root>/driftflow.toml`.
    pub fn write_settings(&self, system: &str) -> PathBuf {
        write(&self.root().join("driftflow.toml"), &self.settings_toml(system))
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to the root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
