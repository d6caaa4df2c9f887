//! Git command runner.
//!
//! Producing diffs between revisions and applying a diff to a source tree
//! both go through [`run_git`], which captures output and maps a non-zero
//! exit to [`VariError::Git`].

use crate::error::{Result, VariError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output, untouched. Diff text depends on its trailing newline.
    pub stdout: String,
    /// Standard error (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty()
    }

    /// Non-empty stdout lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|l| !l.is_empty()).collect()
    }
}

/// Run a git command in `cwd`.
///
/// # Examples
///
/// ```no_run
/// use varidelta::git::run_git;
/// use std::path::Path;
///
/// let output = run_git(Path::new("."), &["rev-parse", "HEAD"])?;
/// println!("head: {}", output.stdout.trim());
/// # Ok::<(), varidelta::error::VariError>(())
/// ```
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    debug!(cwd = %cwd.display(), ?args, "running git");

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            VariError::Git(format!(
                "failed to execute git {}: {} (is git installed?)",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.trim().to_string()
        } else {
            git_output.stderr.clone()
        };

        Err(VariError::Git(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Top-level directory of the repository containing `cwd`.
pub fn repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = run_git(cwd.as_ref(), &["rev-parse", "--show-toplevel"]).map_err(|_| {
        VariError::Config(format!(
            "'{}' is not inside a git repository",
            cwd.as_ref().display()
        ))
    })?;
    Ok(PathBuf::from(output.stdout.trim()))
}

/// Unified diff between two revisions of `repo`.
///
/// Renames are reported as a deletion plus an addition and binary changes
/// carry their marker, which is what the diff parser expects.
pub fn diff_revisions<P: AsRef<Path>>(repo: P, old_rev: &str, new_rev: &str) -> Result<String> {
    let output = run_git(
        repo,
        &["diff", "--no-renames", "--no-color", "--binary", old_rev, new_rev],
    )?;
    Ok(output.stdout)
}

/// Apply a diff file to the working tree at `tree`.
///
/// A failed apply leaves `tree` untouched (git checks the whole patch first);
/// the caller must not continue with the unpatched tree.
pub fn apply_diff<P: AsRef<Path>, D: AsRef<Path>>(tree: P, diff_file: D) -> Result<()> {
    let diff_file = diff_file.as_ref();
    let path = diff_file.to_str().ok_or_else(|| {
        VariError::Config(format!("diff path '{}' is not valid UTF-8", diff_file.display()))
    })?;
    run_git(tree, &["apply", "--whitespace=nowarn", path])?;
    Ok(())
}
