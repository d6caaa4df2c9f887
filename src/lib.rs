//! Varidelta: incremental-analysis support for variability-aware code models.
//!
//! - [`diff`] parses `git diff` output into per-file change entries
//! - [`translate`] carries line numbers across a change without re-reading files
//! - [`store`] keeps the current and previous generation of extracted artifacts
//! - [`strategy`] classifies entries and selects the paths to re-extract
//!
//! The `varidelta` binary wraps these behind a small CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod journal;
pub mod logging;
pub mod store;
pub mod strategy;
pub mod translate;

#[cfg(test)]
pub(crate) mod test_support;
