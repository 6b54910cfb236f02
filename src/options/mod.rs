//! User-facing configuration with TOML preset support.
//!
//! Options serialize to/from TOML for presets stored in `assets/presets/`
//! and describe themselves with a JSON schema for options panels.

mod compression;

use std::path::Path;

pub use compression::CompressionOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Top-level options container. Sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `bitrate`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Codec emulation parameters.
    pub compression: CompressionOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the file cannot be read and
    /// [`CodecError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OptionsParse`] on malformed input, including a
    /// zero `downsample`.
    pub fn from_toml(content: &str) -> Result<Self, CodecError> {
        toml::from_str(content)
            .map_err(|e| CodecError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OptionsParse`] if serialization fails and
    /// [`CodecError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CodecError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
