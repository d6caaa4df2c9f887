//! Command implementations for varidelta.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command resolves a [`RunContext`] first, so config
//! errors surface before any work is done.

mod apply;
mod map;
mod parse;
mod store;

use crate::cli::{Cli, Command};
use crate::context::RunContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = RunContext::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Parse(args) => parse::cmd_parse(&ctx, args),
        Command::Map(args) => map::cmd_map(&ctx, args),
        Command::Apply(args) => apply::cmd_apply(args),
        Command::Store(store_cmd) => store::dispatch_store(&ctx, store_cmd),
    }
}
