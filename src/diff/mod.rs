//! Unified diff parsing for incremental re-analysis.
//!
//! Turns `git diff` output into one [`FileChangeEntry`] per file, each with an
//! ordered list of [`LineRun`]s. The runs carry enough information to map line
//! numbers between the two revisions without reading file contents (see
//! [`crate::translate`]).
//!
//! The parser handles:
//! - Additions, deletions, and modifications (`new file mode`, `deleted file mode`, `index`)
//! - Permission changes (`old mode` / `new mode`)
//! - Binary patches (entry kept, body skipped)
//! - "\ No newline at end of file" markers
//! - Renames expressed as a deletion followed by an addition of the same path

mod api;
mod helpers;
mod parser;
mod types;


// Re-export public API
pub use api::{diff_between, parse_diff_file};
pub(crate) use helpers::normalize_path;
pub use parser::{DiffOptions, DiffParser, parse_diff};
pub use types::{
    ChangeKind, DiffSet, FileChangeEntry, LineKind, LineRun, Permissions, VariabilityChange,
};
