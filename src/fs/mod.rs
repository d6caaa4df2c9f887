//! Filesystem utilities for varidelta.
//!
//! Atomic writes and file moves used by the versioned artifact store, so an
//! artifact or metadata file is never observed half-written.

pub mod atomic;
mod move_file;

pub use atomic::{StagedFile, atomic_write};
pub use move_file::{move_file, remove_file_if_exists};
