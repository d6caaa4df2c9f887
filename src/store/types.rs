//! Keys, kinds, and change flags of the versioned artifact store.

use crate::diff::normalize_path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three artifact families kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Per-file code model, keyed by source path.
    Code,
    /// Singleton build model.
    Build,
    /// Singleton variability model.
    Variability,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Code,
        ArtifactKind::Build,
        ArtifactKind::Variability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Code => "code",
            ArtifactKind::Build => "build",
            ArtifactKind::Variability => "variability",
        }
    }

    /// Parse a kind from its lowercase name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "code" => Some(Self::Code),
            "build" => Some(Self::Build),
            "variability" => Some(Self::Variability),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identity of one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ArtifactKey {
    Code(String),
    Build,
    Variability,
}

impl ArtifactKey {
    /// Key for the code artifact of `path` (separators normalized to `/`).
    pub fn code(path: impl AsRef<str>) -> Self {
        ArtifactKey::Code(normalize_path(path.as_ref()))
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactKey::Code(_) => ArtifactKind::Code,
            ArtifactKey::Build => ArtifactKind::Build,
            ArtifactKey::Variability => ArtifactKind::Variability,
        }
    }

    /// Source path of a code artifact.
    pub fn path(&self) -> Option<&str> {
        match self {
            ArtifactKey::Code(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKey::Code(path) => write!(f, "code artifact '{}'", path),
            ArtifactKey::Build => write!(f, "build artifact"),
            ArtifactKey::Variability => write!(f, "variability artifact"),
        }
    }
}

/// Why an artifact changed since the last history clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeFlag {
    Addition,
    Modification,
    Deletion,
    /// Re-extracted in this generation.
    ExtractionChange,
    /// Changed by something other than extraction, e.g. line-number adjustment.
    AuxiliaryChange,
}

impl ChangeFlag {
    pub const ALL: [ChangeFlag; 5] = [
        ChangeFlag::Addition,
        ChangeFlag::Modification,
        ChangeFlag::Deletion,
        ChangeFlag::ExtractionChange,
        ChangeFlag::AuxiliaryChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFlag::Addition => "addition",
            ChangeFlag::Modification => "modification",
            ChangeFlag::Deletion => "deletion",
            ChangeFlag::ExtractionChange => "extraction_change",
            ChangeFlag::AuxiliaryChange => "auxiliary_change",
        }
    }

    /// Parse a flag from its snake_case name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_str() == s)
    }
}

impl fmt::Display for ChangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Summary of what the store currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub current_code: usize,
    pub current_build: bool,
    pub current_variability: bool,
    /// Artifacts displaced into the previous generation.
    pub previous: usize,
    pub flagged_keys: usize,
}
