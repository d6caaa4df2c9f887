//! Exit code constants for the varidelta CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Diff parse failure
//! - 3: Store failure (I/O, missing artifact, codec)
//! - 4: Git operation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The diff text could not be parsed.
pub const PARSE_FAILURE: i32 = 2;

/// Artifact store failure: I/O, missing key, or codec error.
pub const STORE_FAILURE: i32 = 3;

/// Git operation failure: diff generation or apply errors.
pub const GIT_FAILURE: i32 = 4;
