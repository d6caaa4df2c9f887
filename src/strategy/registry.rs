//! Strategy selection by configuration key.

use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::{HeuristicClassifier, NoClassifier};
use super::filter::{AllFilter, ChangedOnlyFilter, GlobFilter, VariabilityFilter};
use super::{FileEntryFilter, VariabilityClassifier};

/// Named [`VariabilityClassifier`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    #[default]
    Heuristic,
    #[serde(rename = "none")]
    Disabled,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 2] = [ClassifierKind::Heuristic, ClassifierKind::Disabled];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierKind::Heuristic => "heuristic",
            ClassifierKind::Disabled => "none",
        }
    }

    /// Parse a classifier from its configuration key.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn build(self, config: &Config) -> Result<Box<dyn VariabilityClassifier>> {
        Ok(match self {
            ClassifierKind::Heuristic => {
                Box::new(HeuristicClassifier::new(&config.variability_file_globs)?)
            }
            ClassifierKind::Disabled => Box::new(NoClassifier),
        })
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Named [`FileEntryFilter`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    All,
    ChangedOnly,
    Glob,
    Variability,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::All,
        FilterKind::ChangedOnly,
        FilterKind::Glob,
        FilterKind::Variability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::ChangedOnly => "changed-only",
            FilterKind::Glob => "glob",
            FilterKind::Variability => "variability",
        }
    }

    /// Parse a filter from its configuration key.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn build(self, config: &Config) -> Result<Box<dyn FileEntryFilter>> {
        Ok(match self {
            FilterKind::All => Box::new(AllFilter),
            FilterKind::ChangedOnly => Box::new(ChangedOnlyFilter),
            FilterKind::Glob => Box::new(GlobFilter::new(&config.filter_globs)?),
            FilterKind::Variability => Box::new(VariabilityFilter),
        })
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
