//! Settings resolution
//!
//! Settings are loaded and merged from these sources (later sources override
//! earlier):
//!
//! 1. **Built-in defaults** - stores under `/var/opt/driftflow/git`, system
//!    from `/etc/clustername`
//! 2. **Site config** - `./etc/driftflow.toml`
//! 3. **User config** - `<config_dir>/driftflow/config.toml`
//! 4. **Explicit config** - the file given with `--config`
//! 5. **Command-line overrides**
//!
//! # Example
//!
//! ```ignore
//! use drift_core::config::{SettingsOverrides, SettingsResolver};
//!
//! let settings = SettingsResolver::new().resolve(&SettingsOverrides::default())?;
//! println!("system: {}", settings.system()?);
//! ```

mod layer;
mod resolver;

pub use layer::{SettingsLayer, StoreConfig};
pub use resolver::{Settings, SettingsOverrides, SettingsResolver};
