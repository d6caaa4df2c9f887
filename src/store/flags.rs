//! Change-flag registry persisted as store metadata.
//!
//! Flags live in one JSON document (`meta/flags.json`) rather than as marker
//! files. The store updates the in-memory map and rewrites the document with an
//! atomic write only after the artifact files it describes have been moved.

use crate::error::{Result, VariError};
use crate::fs::atomic_write;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::types::{ArtifactKey, ArtifactKind, ChangeFlag};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FlagFile {
    version: u32,
    entries: Vec<FlagRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlagRecord {
    key: ArtifactKey,
    flags: BTreeSet<ChangeFlag>,
}

/// Map from artifact key to the set of flags raised since the last clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct FlagRegistry {
    flags: BTreeMap<ArtifactKey, BTreeSet<ChangeFlag>>,
}

impl FlagRegistry {
    /// Load the registry; a missing file means no flags.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            VariError::Io(format!(
                "failed to read flag metadata '{}': {}",
                path.display(),
                e
            ))
        })?;
        let file: FlagFile = serde_json::from_str(&content).map_err(|e| {
            VariError::Serialization(format!(
                "failed to parse flag metadata '{}': {}",
                path.display(),
                e
            ))
        })?;
        if file.version != FORMAT_VERSION {
            return Err(VariError::Serialization(format!(
                "unsupported flag metadata version {} in '{}'",
                file.version,
                path.display()
            )));
        }

        let flags = file
            .entries
            .into_iter()
            .filter(|r| !r.flags.is_empty())
            .map(|r| (r.key, r.flags))
            .collect();
        Ok(Self { flags })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = FlagFile {
            version: FORMAT_VERSION,
            entries: self
                .flags
                .iter()
                .map(|(key, flags)| FlagRecord {
                    key: key.clone(),
                    flags: flags.clone(),
                })
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| {
            VariError::Serialization(format!("failed to serialize flag metadata: {}", e))
        })?;
        atomic_write(path, &json)
    }

    pub fn get(&self, key: &ArtifactKey) -> BTreeSet<ChangeFlag> {
        self.flags.get(key).cloned().unwrap_or_default()
    }

    pub fn has(&self, key: &ArtifactKey, flag: ChangeFlag) -> bool {
        self.flags.get(key).is_some_and(|set| set.contains(&flag))
    }

    /// Raise `flag`; returns false if it was already set.
    pub fn insert(&mut self, key: &ArtifactKey, flag: ChangeFlag) -> bool {
        self.flags.entry(key.clone()).or_default().insert(flag)
    }

    pub fn keys_with(&self, kind: ArtifactKind, flag: ChangeFlag) -> Vec<ArtifactKey> {
        self.flags
            .iter()
            .filter(|(key, set)| key.kind() == kind && set.contains(&flag))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}
