//! Pluggable strategies applied to a parsed diff.
//!
//! A [`VariabilityClassifier`] tags each entry with a [`VariabilityChange`]
//! verdict, and a [`FileEntryFilter`] picks the paths forwarded to extraction.
//! Both are selected by configuration key through [`ClassifierKind`] and
//! [`FilterKind`].

mod classifier;
mod filter;
mod registry;


pub use classifier::{HeuristicClassifier, NoClassifier};
pub use filter::{AllFilter, ChangedOnlyFilter, GlobFilter, VariabilityFilter};
pub use registry::{ClassifierKind, FilterKind};

pub(crate) use filter::build_globset;

use crate::diff::{DiffSet, FileChangeEntry, VariabilityChange};
use tracing::{debug, warn};

/// Decides whether a file change touches variability.
pub trait VariabilityClassifier {
    /// Verdict for one entry, or `None` when it cannot be determined.
    fn classify(&self, entry: &FileChangeEntry) -> Option<VariabilityChange>;
}

/// Selects the paths of a diff that need re-extraction.
pub trait FileEntryFilter {
    /// Selected paths, in diff order.
    fn select(&self, diff: &DiffSet) -> Vec<String>;
}

/// Set `variability_change` on every entry of `diff`.
///
/// Entries the classifier cannot decide are marked CHANGE so they are
/// re-extracted rather than skipped.
pub fn annotate(diff: &mut DiffSet, classifier: &dyn VariabilityClassifier) {
    for entry in diff.iter_mut() {
        let verdict = match classifier.classify(entry) {
            Some(verdict) => verdict,
            None => {
                warn!(
                    path = %entry.path,
                    "could not classify variability change, assuming it changed"
                );
                VariabilityChange::Change
            }
        };
        debug!(path = %entry.path, %verdict, "classified entry");
        entry.variability_change = verdict;
    }
}
