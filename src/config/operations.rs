//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::diff::DiffOptions;
use crate::error::{Result, VariError};
use crate::strategy::{FilterKind, build_globset};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".varidelta.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(VariError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            VariError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `dir/.varidelta.yaml`, or the defaults when it does not exist.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| VariError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| VariError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `store_root` must be non-empty
    /// - `code_extension` must be non-empty, have no leading dot or path
    ///   separator, and must not be `tmp`
    /// - every glob must compile; the `glob` filter needs at least one
    pub fn validate(&self) -> Result<()> {
        if self.store_root.trim().is_empty() {
            return Err(VariError::Config(
                "config validation failed: store_root must be non-empty".to_string(),
            ));
        }

        let ext = &self.code_extension;
        if ext.is_empty() {
            return Err(VariError::Config(
                "config validation failed: code_extension must be non-empty".to_string(),
            ));
        }
        if ext.starts_with('.') {
            return Err(VariError::Config(format!(
                "config validation failed: code_extension must not have a leading dot (found '{}'). Use '{}' instead.",
                ext,
                ext.trim_start_matches('.')
            )));
        }
        if ext.contains(['/', '\\']) || ext == "tmp" {
            return Err(VariError::Config(format!(
                "config validation failed: '{}' cannot be used as code_extension",
                ext
            )));
        }

        build_globset(&self.variability_file_globs, "variability_file_globs")?;
        build_globset(&self.filter_globs, "filter_globs")?;
        if self.filter == FilterKind::Glob && self.filter_globs.is_empty() {
            return Err(VariError::Config(
                "config validation failed: filter 'glob' requires at least one entry in filter_globs"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Parser options derived from this config.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            header_context_as_line: self.header_context_as_line,
        }
    }

    /// Store root resolved against `base` when relative.
    pub fn store_root_in<P: AsRef<Path>>(&self, base: P) -> PathBuf {
        let root = Path::new(&self.store_root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            base.as_ref().join(root)
        }
    }
}
