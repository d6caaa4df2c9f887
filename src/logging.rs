//! Logging setup for the `varidelta` binary.
//!
//! Library code logs through `tracing` macros only; the binary installs one
//! fmt subscriber on stderr so stdout stays clean for command output.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a filter directive (e.g. `varidelta=debug`).
pub const LOG_ENV: &str = "VARIDELTA_LOG";

/// Filter directive for `-v` repetitions, overridden by `env` when it is set.
pub fn filter_directive(verbosity: u8, env: Option<&str>) -> String {
    if let Some(directive) = env.map(str::trim)
        && !directive.is_empty()
    {
        return directive.to_string();
    }

    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: u8) {
    let env = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(verbosity, env.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
