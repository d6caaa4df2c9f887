//! Config struct definition and default implementation.

use super::types::*;
use crate::strategy::{ClassifierKind, FilterKind};
use serde::{Deserialize, Serialize};

/// Configuration for incremental analysis runs.
///
/// This struct represents the contents of `.varidelta.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Store settings
    // =========================================================================
    /// Root directory of the versioned artifact store. Relative paths are
    /// resolved against the directory holding the config file.
    #[serde(default = "default_store_root")]
    pub store_root: String,

    /// Suffix of artifact files (no leading dot).
    #[serde(default = "default_code_extension")]
    pub code_extension: String,

    // =========================================================================
    // Diff settings
    // =========================================================================
    /// Count the text after a hunk header's closing `@@` as one unmodified line.
    #[serde(default = "default_true")]
    pub header_context_as_line: bool,

    // =========================================================================
    // Strategies
    // =========================================================================
    /// Filter selecting the paths forwarded to extraction.
    #[serde(default)]
    pub filter: FilterKind,

    /// Globs used by the `glob` filter.
    #[serde(default)]
    pub filter_globs: Vec<String>,

    /// Classifier producing variability verdicts.
    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Files the `heuristic` classifier treats as variability-bearing.
    #[serde(default = "default_variability_file_globs")]
    pub variability_file_globs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            code_extension: default_code_extension(),
            header_context_as_line: default_true(),
            filter: FilterKind::default(),
            filter_globs: Vec::new(),
            classifier: ClassifierKind::default(),
            variability_file_globs: default_variability_file_globs(),
        }
    }
}
