//! Atomic filesystem writes.
//!
//! Every write goes through a staged temporary file:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! `rename()` replaces the destination atomically when source and destination
//! live on the same filesystem, which holds because the temporary file is a
//! sibling of the target. On crash a `.{filename}.{pid}.{n}.tmp` file may
//! remain; it is never read back.
//!
//! [`StagedFile`] exposes steps 1–2 and step 3 separately so a caller can do
//! other work between "content is durable" and "content is visible".

use crate::error::{Result, VariError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Content written and synced next to its target, not yet visible there.
///
/// Dropping a staged file without committing removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `content` to a temporary sibling of `target` and sync it.
    pub fn stage<P: AsRef<Path>>(target: P, content: &[u8]) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        ensure_parent(&target)?;

        let temp_path = generate_temp_path(&target)?;
        write_and_sync(&temp_path, content)?;

        Ok(Self {
            temp_path,
            target,
            committed: false,
        })
    }

    /// Atomically move the staged content into place.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp_path, &self.target).map_err(|e| {
            VariError::Io(format!(
                "failed to atomically replace '{}': {}",
                self.target.display(),
                e
            ))
        })?;
        self.committed = true;

        // Persist the directory entry as well.
        if let Some(parent) = self.target.parent()
            && let Ok(dir) = File::open(parent)
        {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Atomically write bytes to a file.
///
/// The target is never observed in a partial state: readers see either the
/// old content or the complete new content.
///
/// # Example
///
/// ```no_run
/// use varidelta::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("meta/flags.json"), b"{}")?;
/// # Ok::<(), varidelta::error::VariError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    StagedFile::stage(path, content)?.commit()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            VariError::Io(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Generate a unique temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| VariError::Io(format!("invalid file path '{}'", target.display())))?;

    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", filename, std::process::id(), n);
    Ok(parent.join(temp_name))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        VariError::Io(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(VariError::Io(format!(
            "failed to write temporary file '{}': {}",
            path.display(),
            e
        )));
    }

    Ok(())
}
