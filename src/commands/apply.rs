//! Implementation of the `varidelta apply` command.

use crate::cli::ApplyArgs;
use crate::error::Result;
use crate::git;
use tracing::info;

/// Apply a diff to a tree; any failure aborts with a git error.
pub fn cmd_apply(args: ApplyArgs) -> Result<()> {
    git::apply_diff(&args.tree, &args.diff)?;
    info!(tree = %args.tree.display(), diff = %args.diff.display(), "applied diff");
    println!("Applied {} to {}", args.diff.display(), args.tree.display());
    Ok(())
}
