//! Format-agnostic loading and saving of settings and manifests

use crate::{Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

/// Serialization formats understood by [`ConfigStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFormat {
    Toml,
    Json,
    Yaml,
}

impl StoreFormat {
    fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension (`.toml`, `.json`,
/// `.yaml`/`.yml`) and writes through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = StoreFormat::from_path(path)?;
        let content = io::read_text(path)?;
        self.parse(path, format, &content)
    }

    /// Load configuration from a file, treating empty content as `T::default()`.
    ///
    /// An empty YAML document deserializes to unit, which most mapping types
    /// reject, so blank manifests are handled here.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, path: &NormalizedPath) -> Result<T> {
        let format = StoreFormat::from_path(path)?;
        let content = io::read_text(path)?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        self.parse(path, format, &content)
    }

    fn parse<T: DeserializeOwned>(
        &self,
        path: &NormalizedPath,
        format: StoreFormat,
        content: &str,
    ) -> Result<T> {
        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_native(),
            format: format.label().into(),
            message,
        };
        match format {
            StoreFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            StoreFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            StoreFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Save configuration to a file atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = StoreFormat::from_path(path)?;
        let serialize_error = |message: String| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.label().into(),
            message,
        };

        let content = match format {
            StoreFormat::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            StoreFormat::Json => {
                serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            StoreFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))?
            }
        };

        io::write_atomic(path, content.as_bytes())
    }
}
