//! CLI argument parsing for varidelta.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Varidelta: diff parsing, line mapping, and versioned artifact storage
/// for incremental variability analysis.
#[derive(Parser, Debug)]
#[command(name = "varidelta")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ./.varidelta.yaml when present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for varidelta.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a unified diff and show its file entries.
    ///
    /// Runs the configured classifier and filter; selected paths are the
    /// ones an incremental run would re-extract.
    Parse(ParseArgs),

    /// Map a line number of one file across a diff.
    Map(MapArgs),

    /// Apply a diff to a source tree with `git apply`.
    Apply(ApplyArgs),

    /// Inspect or maintain the versioned artifact store.
    Store(StoreCommand),
}

/// Arguments for the `parse` command.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Diff file to parse.
    #[arg(required_unless_present = "git", conflicts_with = "git")]
    pub diff: Option<PathBuf>,

    /// Diff two revisions of a repository instead of reading a file.
    #[arg(long, num_args = 2, value_names = ["OLD", "NEW"])]
    pub git: Option<Vec<String>>,

    /// Repository used with --git.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Print entries as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `map` command.
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Diff file describing the change.
    pub diff: PathBuf,

    /// Path of the file as it appears in the diff.
    pub path: String,

    /// 1-based line number to map.
    pub line: u32,

    /// Map a new-revision line back to the old revision.
    #[arg(long)]
    pub reverse: bool,
}

/// Arguments for the `apply` command.
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Diff file to apply.
    pub diff: PathBuf,

    /// Tree to patch.
    #[arg(long, default_value = ".")]
    pub tree: PathBuf,
}

/// Store subcommands.
#[derive(Parser, Debug)]
pub struct StoreCommand {
    #[command(subcommand)]
    pub action: StoreAction,
}

/// Available store actions.
#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// Show artifact counts and flagged keys.
    Status,

    /// Show the change flags of one artifact.
    Flags(StoreFlagsArgs),

    /// List artifacts carrying a flag.
    List(StoreListArgs),

    /// Restore the store to the start of the current generation.
    ///
    /// Requires --force.
    Rollback(ForceArgs),

    /// Drop the previous generation and every flag.
    ///
    /// Requires --force.
    ClearHistory(ForceArgs),

    /// Print the store journal.
    Log(StoreLogArgs),
}

/// Arguments for the `store flags` command.
#[derive(Parser, Debug)]
pub struct StoreFlagsArgs {
    /// Source path of a code artifact (required for --kind code).
    pub path: Option<String>,

    /// Artifact kind (code, build, variability).
    #[arg(long, default_value = "code")]
    pub kind: String,
}

/// Arguments for the `store list` command.
#[derive(Parser, Debug)]
pub struct StoreListArgs {
    /// Flag to select (addition, modification, deletion, extraction_change, auxiliary_change).
    #[arg(long)]
    pub flag: String,

    /// Artifact kind (code, build, variability).
    #[arg(long, default_value = "code")]
    pub kind: String,
}

/// Confirmation for destructive store actions.
#[derive(Parser, Debug)]
pub struct ForceArgs {
    /// Confirm the operation.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `store log` command.
#[derive(Parser, Debug)]
pub struct StoreLogArgs {
    /// Show only the last N entries.
    #[arg(long)]
    pub limit: Option<usize>,
}
