//! External collaborators behind narrow traits
//!
//! The reconciler never renders, shells out, decrypts or touches file
//! ownership directly; it goes through these seams so tests can substitute
//! recording fakes.

mod process;
mod render;
mod vault;

use std::sync::Arc;

use drift_content::SecretDecryptor;
use drift_fs::{AttributeAccessor, PosixAttributes};

use crate::config::Settings;

pub use process::{ProcessOutput, ProcessRunner, SystemRunner, run_checked};
pub use render::{MiniJinjaRenderer, TemplateRenderer};
pub use vault::AnsibleVaultCommand;

/// The set of collaborators used for one run
pub struct Collaborators {
    pub renderer: Box<dyn TemplateRenderer>,
    pub runner: Arc<dyn ProcessRunner>,
    pub attributes: Box<dyn AttributeAccessor>,
    /// `None` when no vault key material is configured
    pub decryptor: Option<Arc<dyn SecretDecryptor>>,
}

impl Collaborators {
    /// Collaborators acting on the local host
    pub fn system(settings: &Settings) -> Self {
        let runner: Arc<dyn ProcessRunner> = Arc::new(SystemRunner);
        let decryptor = settings.password_file().map(|password_file| {
            Arc::new(AnsibleVaultCommand::new(runner.clone(), password_file))
                as Arc<dyn SecretDecryptor>
        });
        Self {
            renderer: Box::new(MiniJinjaRenderer::new()),
            runner,
            attributes: Box::new(PosixAttributes::new()),
            decryptor,
        }
    }
}
