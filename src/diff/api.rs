//! Public API for diff parsing.

use crate::error::{Result, VariError};
use crate::git;
use std::path::Path;

use super::parser::DiffParser;
use super::types::DiffSet;

/// Read and parse a diff file from disk.
///
/// # Returns
///
/// * `Ok(DiffSet)` - Parsed entries in order of first appearance
/// * `Err(VariError::Io)` - The file could not be read
/// * `Err(VariError::Parse)` - The diff text is malformed
pub fn parse_diff_file<P: AsRef<Path>>(parser: &DiffParser, path: P) -> Result<DiffSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        VariError::Io(format!("failed to read diff file '{}': {}", path.display(), e))
    })?;

    parser.parse(&text)
}

/// Diff two revisions of a repository and parse the result.
///
/// Runs `git diff --no-renames --binary {old_rev} {new_rev}` so renames show
/// up as deletion + addition pairs, which the parser coalesces.
pub fn diff_between<P: AsRef<Path>>(
    parser: &DiffParser,
    repo: P,
    old_rev: &str,
    new_rev: &str,
) -> Result<DiffSet> {
    let text = git::diff_revisions(repo, old_rev, new_rev)?;
    parser.parse(&text)
}
