//! On-disk layout of a store root.
//!
//! ```text
//! <root>/
//!   current/code/<encoded path>.<ext>    current/build.<ext>    current/variability.<ext>
//!   previous/...                         (same key space, displaced values)
//!   baseline/...                         (generation-start values displaced twice)
//!   meta/flags.json
//!   journal.ndjson
//! ```
//!
//! Code paths are flattened into one file name: `/` becomes `#`, and literal
//! `%` and `#` are percent-escaped so distinct paths never collide.

use crate::error::{Result, VariError};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::ArtifactKey;

const PATH_SEPARATOR: char = '#';

/// Storage area of one artifact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Area {
    Current,
    Previous,
    Baseline,
}

impl Area {
    fn dir_name(self) -> &'static str {
        match self {
            Area::Current => "current",
            Area::Previous => "previous",
            Area::Baseline => "baseline",
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct StoreLayout {
    root: PathBuf,
    extension: String,
}

impl StoreLayout {
    pub fn new(root: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            root,
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn area_dir(&self, area: Area) -> PathBuf {
        self.root.join(area.dir_name())
    }

    pub fn flags_path(&self) -> PathBuf {
        self.root.join("meta").join("flags.json")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.root.join("journal.ndjson")
    }

    pub fn artifact_path(&self, area: Area, key: &ArtifactKey) -> PathBuf {
        let dir = self.area_dir(area);
        match key {
            ArtifactKey::Code(path) => dir
                .join("code")
                .join(encode_code_key(path, &self.extension)),
            ArtifactKey::Build => dir.join(format!("build.{}", self.extension)),
            ArtifactKey::Variability => dir.join(format!("variability.{}", self.extension)),
        }
    }

    /// Create every area directory.
    pub fn create(&self) -> Result<()> {
        for area in [Area::Current, Area::Previous, Area::Baseline] {
            let dir = self.area_dir(area).join("code");
            fs::create_dir_all(&dir).map_err(|e| {
                VariError::Io(format!(
                    "failed to create store directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Remove and recreate one area.
    pub fn reset(&self, area: Area) -> Result<()> {
        let dir = self.area_dir(area);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| {
                VariError::Io(format!(
                    "failed to discard store directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        fs::create_dir_all(dir.join("code")).map_err(|e| {
            VariError::Io(format!(
                "failed to recreate store directory '{}': {}",
                dir.display(),
                e
            ))
        })
    }

    /// Every key with a value in `area`, code keys sorted by path.
    pub fn keys(&self, area: Area) -> Result<Vec<ArtifactKey>> {
        let mut keys = Vec::new();

        let code_dir = self.area_dir(area).join("code");
        if code_dir.exists() {
            let entries = fs::read_dir(&code_dir).map_err(|e| {
                VariError::Io(format!(
                    "failed to list store directory '{}': {}",
                    code_dir.display(),
                    e
                ))
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| {
                    VariError::Io(format!(
                        "failed to read entry in '{}': {}",
                        code_dir.display(),
                        e
                    ))
                })?;
                let name = entry.file_name();
                if let Some(path) = name
                    .to_str()
                    .and_then(|n| decode_code_key(n, &self.extension))
                {
                    keys.push(ArtifactKey::Code(path));
                }
            }
        }
        keys.sort();

        for key in [ArtifactKey::Build, ArtifactKey::Variability] {
            if self.artifact_path(area, &key).exists() {
                keys.push(key);
            }
        }

        Ok(keys)
    }
}

/// Flatten a source path into a collision-free file name.
pub(super) fn encode_code_key(path: &str, extension: &str) -> String {
    let mut out = String::with_capacity(path.len() + extension.len() + 1);
    for ch in path.chars() {
        match ch {
            '%' => out.push_str("%25"),
            PATH_SEPARATOR => out.push_str("%23"),
            '/' => out.push(PATH_SEPARATOR),
            other => out.push(other),
        }
    }
    out.push('.');
    out.push_str(extension);
    out
}

/// Reverse [`encode_code_key`]; None for names that are not code artifacts
/// (temporary files, foreign files).
pub(super) fn decode_code_key(name: &str, extension: &str) -> Option<String> {
    if name.starts_with('.') && name.ends_with(".tmp") {
        return None;
    }
    let stem = name.strip_suffix(extension)?.strip_suffix('.')?;

    let mut out = String::with_capacity(stem.len());
    let mut chars = stem.chars();
    while let Some(ch) = chars.next() {
        match ch {
            PATH_SEPARATOR => out.push('/'),
            '%' => {
                let code: String = chars.by_ref().take(2).collect();
                match code.as_str() {
                    "25" => out.push('%'),
                    "23" => out.push(PATH_SEPARATOR),
                    _ => return None,
                }
            }
            other => out.push(other),
        }
    }
    Some(out)
}
