//! Built-in variability classifiers.

use crate::diff::{ChangeKind, FileChangeEntry, VariabilityChange};
use crate::error::Result;
use globset::GlobSet;
use regex::Regex;
use std::sync::LazyLock;

use super::VariabilityClassifier;
use super::filter::build_globset;

static CONDITIONAL_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*(if|ifdef|ifndef|elif|else|endif)\b")
        .expect("Invalid conditional directive regex")
});

static CONFIG_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCONFIG_[A-Za-z0-9_]+").expect("Invalid config symbol regex"));

/// Classifies by file name and by the text of changed lines.
///
/// - Paths outside `variability_files` are NOT_A_VARIABILITY_FILE.
/// - Additions, deletions, and any change to a `Kconfig*` file are CHANGE.
/// - Otherwise CHANGE when an added or deleted line is a preprocessor
///   conditional or mentions a `CONFIG_` symbol, NO_CHANGE if none does.
/// - Binary entries have no line text and stay undecided.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    variability_files: GlobSet,
}

impl HeuristicClassifier {
    pub fn new(variability_file_globs: &[String]) -> Result<Self> {
        Ok(Self {
            variability_files: build_globset(variability_file_globs, "variability_file_globs")?,
        })
    }
}

impl VariabilityClassifier for HeuristicClassifier {
    fn classify(&self, entry: &FileChangeEntry) -> Option<VariabilityChange> {
        if !self.variability_files.is_match(&entry.path) {
            return Some(VariabilityChange::NotAVariabilityFile);
        }
        if entry.binary {
            return None;
        }
        if entry.change_kind != ChangeKind::Modification || is_kconfig(&entry.path) {
            return Some(VariabilityChange::Change);
        }

        let touches_variability = entry
            .changed_content()
            .any(|line| CONDITIONAL_DIRECTIVE.is_match(line) || CONFIG_SYMBOL.is_match(line));

        Some(if touches_variability {
            VariabilityChange::Change
        } else {
            VariabilityChange::NoChange
        })
    }
}

fn is_kconfig(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with("Kconfig"))
}

/// Leaves every entry NOT_ANALYZED.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl VariabilityClassifier for NoClassifier {
    fn classify(&self, _entry: &FileChangeEntry) -> Option<VariabilityChange> {
        Some(VariabilityChange::NotAnalyzed)
    }
}
