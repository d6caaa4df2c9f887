//! File move and removal helpers.
//!
//! The artifact store shifts values between generation directories by moving
//! files. On POSIX filesystems this is an atomic `rename(2)`. Some environments
//! (certain mounts, containers, or cross-volume store roots) surface `EXDEV`
//! ("Invalid cross-device link"); for those we fall back to copy + delete.

use crate::error::{Result, VariError};
use std::fs;
use std::io;
use std::path::Path;

/// Move a single file from `source` to `destination`, replacing it if present.
///
/// - Tries `rename()` first (atomic when possible).
/// - Falls back to an atomic write to `destination` + delete of `source` on EXDEV.
pub fn move_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VariError::Io(format!(
                "failed to create destination directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_rename(&e) => move_file_cross_device(source, destination, e),
        Err(e) => Err(VariError::Io(format!(
            "failed to move '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ))),
    }
}

/// Remove a file, treating an already-missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(VariError::Io(format!(
            "failed to remove '{}': {}",
            path.display(),
            e
        ))),
    }
}

fn move_file_cross_device(
    source: &Path,
    destination: &Path,
    original_error: io::Error,
) -> Result<()> {
    let content = fs::read(source).map_err(|e| {
        VariError::Io(format!(
            "failed to read '{}' for cross-device move: {} (original rename error: {})",
            source.display(),
            e,
            original_error
        ))
    })?;

    crate::fs::atomic_write(destination, &content)?;

    fs::remove_file(source).map_err(|e| {
        VariError::Io(format!(
            "moved '{}' across devices but failed to delete the source: {}",
            source.display(),
            e
        ))
    })?;

    Ok(())
}

fn is_cross_device_rename(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn move_file_moves_file_and_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("current/code/a#b.c.cache");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, b"v1").unwrap();

        let destination = temp.path().join("previous/code/a#b.c.cache");
        move_file(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"v1");
    }

    #[test]
    fn move_file_replaces_existing_destination_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.cache");
        let destination = temp.path().join("destination.cache");

        std::fs::write(&source, b"new").unwrap();
        std::fs::write(&destination, b"old").unwrap();

        move_file(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"new");
    }

    #[test]
    fn move_missing_source_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let err = move_file(temp.path().join("nope"), temp.path().join("dest")).unwrap_err();
        assert!(matches!(err, VariError::Io(_)));
    }

    #[test]
    fn remove_file_if_exists_tolerates_missing_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flagged.cache");
        std::fs::write(&path, b"x").unwrap();

        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!remove_file_if_exists(&path).unwrap());
    }
}
