//! Run context resolution for varidelta commands.
//!
//! Every command starts from a [`RunContext`]: the loaded configuration and
//! the directory relative paths in it are resolved against. With `--config`
//! that is the config file's directory; otherwise the working directory,
//! where `.varidelta.yaml` is picked up when present.

use crate::config::Config;
use crate::diff::DiffParser;
use crate::error::{Result, VariError};
use crate::store::{JsonCodec, VersionedStore};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loaded configuration plus resolved paths.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,

    /// Directory the config's relative paths are resolved against.
    pub base_dir: PathBuf,

    /// Absolute or base-relative store root.
    pub store_root: PathBuf,
}

impl RunContext {
    /// Resolve the context from the current working directory.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            VariError::Config(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd, config_path)
    }

    /// Resolve the context from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P, config_path: Option<&Path>) -> Result<Self> {
        let cwd = cwd.as_ref();

        let (config, base_dir) = match config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    cwd.join(path)
                };
                let base = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.to_path_buf());
                (Config::load(&path)?, base)
            }
            None => (Config::discover(cwd)?, cwd.to_path_buf()),
        };

        let store_root = config.store_root_in(&base_dir);
        debug!(store_root = %store_root.display(), "resolved run context");

        Ok(Self {
            config,
            base_dir,
            store_root,
        })
    }

    /// Diff parser configured from the context.
    pub fn parser(&self) -> DiffParser {
        DiffParser::with_options(self.config.diff_options())
    }

    /// Open (creating if needed) the configured store.
    pub fn open_store(&self) -> Result<VersionedStore> {
        VersionedStore::open_with(
            &self.store_root,
            &self.config.code_extension,
            JsonCodec::default(),
        )
    }
}
