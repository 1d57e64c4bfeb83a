use minijinja::Environment;

use crate::{Error, Result};

/// Renders a desired-state template against a variable tree
pub trait TemplateRenderer {
    /// `name` only identifies the template in errors
    fn render(&self, name: &str, template: &str, vars: &serde_json::Value) -> Result<String>;
}

/// Jinja2-compatible renderer
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Rendered output is compared byte-for-byte with live files
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, template: &str, vars: &serde_json::Value) -> Result<String> {
        self.env
            .render_str(template, vars)
            .map_err(|e| Error::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}
