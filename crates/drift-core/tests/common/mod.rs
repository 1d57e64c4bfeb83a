//! Shared fakes and fixtures for drift-core integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use drift_content::{DecryptError, SecretDecryptor};
use drift_core::{
    Category, Collaborators, MiniJinjaRenderer, ObservedSource, ProcessOutput, ProcessRunner,
    Settings, StoreConfig, Target,
};
use drift_fs::{AttributeAccessor, AttributeRequest, FileAttributes};
use drift_test_utils::TestStores;

pub const SYSTEM: &str = "sys";

type Responder = dyn Fn(&[String]) -> ProcessOutput + Send + Sync;

/// Process runner that records every command and answers from a closure
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    respond: Arc<Responder>,
}

impl RecordingRunner {
    /// Every command succeeds with empty output
    pub fn ok() -> Self {
        Self::with(|_| ProcessOutput::default())
    }

    pub fn with(respond: impl Fn(&[String]) -> ProcessOutput + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(respond),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.join(" ")).collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> drift_core::Result<ProcessOutput> {
        self.calls.lock().unwrap().push(argv.to_vec());
        Ok((self.respond)(argv))
    }
}

pub fn output(code: i32, stdout: &str) -> ProcessOutput {
    ProcessOutput {
        code,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Attribute accessor over an in-memory table; every path starts as
/// `root:root 0644`
#[derive(Clone, Default)]
pub struct RecordingAttributes {
    current: Arc<Mutex<HashMap<PathBuf, FileAttributes>>>,
    sets: Arc<Mutex<Vec<(PathBuf, AttributeRequest)>>>,
    unknown_users: Arc<Mutex<Vec<String>>>,
}

impl RecordingAttributes {
    pub fn sets(&self) -> Vec<(PathBuf, AttributeRequest)> {
        self.sets.lock().unwrap().clone()
    }

    /// Make `set` fail for requests naming `owner`, as for a user missing on the host
    pub fn reject_user(&self, owner: &str) {
        self.unknown_users.lock().unwrap().push(owner.to_string());
    }

    pub fn preset(&self, path: &Path, mode: u32) {
        let mut attributes = default_attributes();
        attributes.mode = mode;
        self.current.lock().unwrap().insert(path.to_path_buf(), attributes);
    }
}

fn default_attributes() -> FileAttributes {
    FileAttributes {
        uid: 0,
        gid: 0,
        owner: Some("root".into()),
        group: Some("root".into()),
        mode: 0o644,
    }
}

impl AttributeAccessor for RecordingAttributes {
    fn get(&self, path: &Path) -> drift_fs::Result<FileAttributes> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(default_attributes))
    }

    fn set(&self, path: &Path, request: &AttributeRequest) -> drift_fs::Result<()> {
        if let Some(owner) = &request.owner
            && self.unknown_users.lock().unwrap().contains(owner)
        {
            return Err(drift_fs::Error::UnknownUser { name: owner.clone() });
        }
        self.sets.lock().unwrap().push((path.to_path_buf(), request.clone()));
        let mut current = self.current.lock().unwrap();
        let entry = current.entry(path.to_path_buf()).or_insert_with(default_attributes);
        if let Some(owner) = &request.owner {
            entry.owner = Some(owner.clone());
        }
        if let Some(group) = &request.group {
            entry.group = Some(group.clone());
        }
        if let Some(mode) = request.mode {
            entry.mode = mode;
        }
        Ok(())
    }
}

/// Decryptor accepting text prefixed with `VAULT:`
pub struct PrefixVault;

impl SecretDecryptor for PrefixVault {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        ciphertext
            .strip_prefix("VAULT:")
            .map(str::to_string)
            .ok_or_else(|| DecryptError::Failed("not a vault".into()))
    }
}

pub fn settings(stores: &TestStores) -> Settings {
    Settings {
        stores: vec![
            StoreConfig::new("primary", stores.store_path("primary")),
            StoreConfig::new("secured", stores.store_path("secured")),
        ],
        system: Some(SYSTEM.to_string()),
        password_file: None,
        configset_path: stores.live_path().join("sets"),
        partition: "p0".to_string(),
    }
}

pub fn collaborators(runner: &RecordingRunner, attributes: &RecordingAttributes) -> Collaborators {
    Collaborators {
        renderer: Box::new(MiniJinjaRenderer::new()),
        runner: Arc::new(runner.clone()),
        attributes: Box::new(attributes.clone()),
        decryptor: None,
    }
}

/// A single templated category `app/app` observed under `live/etc`
pub fn app_target(stores: &TestStores) -> Target {
    Target {
        name: "app".into(),
        maintype: "app".into(),
        categories: vec![
            Category::new("app", "app", "app", ObservedSource::Walk(stores.live_path().join("etc")))
                .templated(None),
        ],
        container: None,
        provision: None,
        validate: None,
    }
}
