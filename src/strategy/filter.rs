//! Built-in file entry filters.

use crate::diff::{ChangeKind, DiffSet, FileChangeEntry, VariabilityChange, normalize_path};
use crate::error::{Result, VariError};
use globset::{Glob, GlobSet, GlobSetBuilder};

use super::FileEntryFilter;

/// Build a GlobSet from a list of glob patterns.
pub(crate) fn build_globset(patterns: &[String], field_name: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(&normalize_path(pattern)).map_err(|e| {
            VariError::Config(format!(
                "invalid glob pattern in {}: '{}' - {}",
                field_name, pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| VariError::Config(format!("failed to compile {} globs: {}", field_name, e)))
}

fn select_where(diff: &DiffSet, pred: impl Fn(&FileChangeEntry) -> bool) -> Vec<String> {
    diff.iter()
        .filter(|entry| pred(entry))
        .map(|entry| entry.path.clone())
        .collect()
}

/// Every path in the diff, deletions included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFilter;

impl FileEntryFilter for AllFilter {
    fn select(&self, diff: &DiffSet) -> Vec<String> {
        select_where(diff, |_| true)
    }
}

/// Added files and modified files whose content changed.
///
/// Deletions and permission-only changes are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangedOnlyFilter;

impl FileEntryFilter for ChangedOnlyFilter {
    fn select(&self, diff: &DiffSet) -> Vec<String> {
        select_where(diff, |entry| match entry.change_kind {
            ChangeKind::Addition => true,
            ChangeKind::Deletion => false,
            ChangeKind::Modification => {
                entry.binary || entry.added_lines() > 0 || entry.deleted_lines() > 0
            }
        })
    }
}

/// Paths matching any of a set of globs.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    globs: GlobSet,
}

impl GlobFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            globs: build_globset(patterns, "filter_globs")?,
        })
    }
}

impl FileEntryFilter for GlobFilter {
    fn select(&self, diff: &DiffSet) -> Vec<String> {
        select_where(diff, |entry| self.globs.is_match(&entry.path))
    }
}

/// Entries a classifier marked CHANGE.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariabilityFilter;

impl FileEntryFilter for VariabilityFilter {
    fn select(&self, diff: &DiffSet) -> Vec<String> {
        select_where(diff, |entry| {
            entry.variability_change == VariabilityChange::Change
        })
    }
}
