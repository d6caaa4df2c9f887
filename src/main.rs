//! Entry point for the `varidelta` CLI.
//!
//! Parses arguments, installs logging, dispatches to the command handler, and
//! maps errors to exit codes.

use std::process::ExitCode;
use varidelta::cli::Cli;
use varidelta::{commands, exit_codes, logging};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
