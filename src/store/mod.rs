//! Two-generation versioned artifact store.
//!
//! Holds code, build, and variability artifacts in a CURRENT generation and
//! keeps the values they displaced in a PREVIOUS generation, together with
//! per-key [`ChangeFlag`]s. The previous generation is sparse: keys that were
//! not touched read through to CURRENT.
//!
//! # Write protocol
//!
//! A `write` stages the encoded artifact next to its CURRENT file (synced,
//! invisible), moves any existing CURRENT value to PREVIOUS, then renames the
//! staged file into place. Flags are persisted last. If the final rename fails
//! the displaced value is moved back and no flag is recorded.
//!
//! # Baseline
//!
//! PREVIOUS always holds the value immediately before the latest change. When
//! a key is displaced a second time within one generation, the value it had at
//! the generation start is kept in a baseline area so [`VersionedStore::rollback`]
//! can restore it.
//!
//! The store is single-writer: mutating methods take `&mut self`, and callers
//! that extract in parallel wrap it in a mutex.

mod codec;
mod flags;
mod layout;
mod types;

#[cfg(test)]
mod tests;

pub use codec::{ArtifactCodec, JsonCodec};
pub use types::{ArtifactKey, ArtifactKind, ChangeFlag, StoreStatus};

use crate::error::{Result, VariError};
use crate::fs::{StagedFile, move_file, remove_file_if_exists};
use crate::journal::{JournalAction, JournalEntry, append_entry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use flags::FlagRegistry;
use layout::{Area, StoreLayout};

/// Default suffix of artifact files.
pub const DEFAULT_EXTENSION: &str = "cache";

/// Versioned artifact store rooted at one directory.
#[derive(Debug)]
pub struct VersionedStore<C: ArtifactCodec = JsonCodec> {
    layout: StoreLayout,
    flags: FlagRegistry,
    codec: C,
    /// Make the next staged-file commit fail.
    #[cfg(test)]
    fail_next_commit: bool,
}

impl VersionedStore<JsonCodec> {
    /// Open (creating if needed) a store with the JSON codec.
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self> {
        Self::open_with(root, DEFAULT_EXTENSION, JsonCodec::default())
    }
}

impl<C: ArtifactCodec> VersionedStore<C> {
    /// Open (creating if needed) a store with a custom file extension and codec.
    pub fn open_with<P: Into<PathBuf>>(root: P, extension: &str, codec: C) -> Result<Self> {
        let layout = StoreLayout::new(root.into(), extension);
        layout.create()?;
        let flags = FlagRegistry::load(&layout.flags_path())?;

        debug!(root = %layout.root().display(), flagged = flags.len(), "opened artifact store");
        Ok(Self {
            layout,
            flags,
            codec,
            #[cfg(test)]
            fail_next_commit: false,
        })
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn journal_path(&self) -> PathBuf {
        self.layout.journal_path()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Store `artifact` as the CURRENT value of `key`.
    ///
    /// Any existing CURRENT value moves to PREVIOUS and the key is flagged
    /// MODIFICATION; a key with no value in this generation is flagged ADDITION.
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &ArtifactKey, artifact: &T) -> Result<()> {
        let bytes = self.codec.encode(artifact)?;
        self.write_bytes(key, &bytes)
    }

    /// Store pre-encoded bytes as the CURRENT value of `key`.
    pub fn write_bytes(&mut self, key: &ArtifactKey, bytes: &[u8]) -> Result<()> {
        let current = self.layout.artifact_path(Area::Current, key);
        let previous = self.layout.artifact_path(Area::Previous, key);

        let staged = StagedFile::stage(&current, bytes)?;
        let had_current = current.exists();
        let had_previous = previous.exists();

        let baselined = if had_current {
            self.displace(key)?
        } else {
            false
        };

        if let Err(err) = self.commit_staged(staged) {
            if had_current {
                self.undo_displace(key, baselined);
            }
            return Err(err);
        }

        let flag = if had_current || had_previous {
            ChangeFlag::Modification
        } else {
            ChangeFlag::Addition
        };
        self.raise(key, flag)?;

        debug!(%key, %flag, "wrote artifact");
        self.journal(
            JournalEntry::new(JournalAction::Write)
                .with_key(key)
                .with_details(json!({ "flag": flag })),
        );
        Ok(())
    }

    /// Move the CURRENT value of `key` to PREVIOUS and flag DELETION.
    pub fn delete(&mut self, key: &ArtifactKey) -> Result<()> {
        let current = self.layout.artifact_path(Area::Current, key);
        if !current.exists() {
            return Err(VariError::NotFound(format!("{} has no current value", key)));
        }

        self.displace(key)?;
        self.raise(key, ChangeFlag::Deletion)?;

        debug!(%key, "deleted artifact");
        self.journal(JournalEntry::new(JournalAction::Delete).with_key(key));
        Ok(())
    }

    /// Record `flag` for `key` without touching any artifact.
    pub fn flag(&mut self, key: &ArtifactKey, flag: ChangeFlag) -> Result<()> {
        self.raise(key, flag)?;
        self.journal(
            JournalEntry::new(JournalAction::Flag)
                .with_key(key)
                .with_details(json!({ "flag": flag })),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// CURRENT value of `key`.
    pub fn read<T: DeserializeOwned>(&self, key: &ArtifactKey) -> Result<T> {
        let bytes = self.read_bytes(key)?;
        self.codec.decode(&bytes)
    }

    pub fn read_bytes(&self, key: &ArtifactKey) -> Result<Vec<u8>> {
        read_artifact(&self.layout.artifact_path(Area::Current, key), key, "current")
    }

    /// PREVIOUS value of `key`.
    ///
    /// Falls back to CURRENT for keys untouched in this generation. Keys flagged
    /// ADDITION without a displaced value did not exist before and yield NotFound.
    pub fn read_previous<T: DeserializeOwned>(&self, key: &ArtifactKey) -> Result<T> {
        let bytes = self.read_previous_bytes(key)?;
        self.codec.decode(&bytes)
    }

    pub fn read_previous_bytes(&self, key: &ArtifactKey) -> Result<Vec<u8>> {
        let previous = self.layout.artifact_path(Area::Previous, key);
        if previous.exists() {
            return read_artifact(&previous, key, "previous");
        }
        if self.flags.has(key, ChangeFlag::Addition) {
            return Err(VariError::NotFound(format!(
                "{} was added in this generation and has no previous value",
                key
            )));
        }
        read_artifact(&self.layout.artifact_path(Area::Current, key), key, "previous")
    }

    /// Whether `key` has a CURRENT value.
    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.layout.artifact_path(Area::Current, key).exists()
    }

    /// Flags raised for `key` since the last history clear.
    pub fn flags(&self, key: &ArtifactKey) -> BTreeSet<ChangeFlag> {
        self.flags.get(key)
    }

    /// Keys of `kind` carrying `flag`, sorted.
    pub fn keys_with_flag(&self, kind: ArtifactKind, flag: ChangeFlag) -> Vec<ArtifactKey> {
        self.flags.keys_with(kind, flag)
    }

    /// Keys of `kind` with a CURRENT value, sorted.
    pub fn keys(&self, kind: ArtifactKind) -> Result<Vec<ArtifactKey>> {
        Ok(self
            .layout
            .keys(Area::Current)?
            .into_iter()
            .filter(|key| key.kind() == kind)
            .collect())
    }

    pub fn status(&self) -> Result<StoreStatus> {
        let current = self.layout.keys(Area::Current)?;
        let previous = self.layout.keys(Area::Previous)?;

        Ok(StoreStatus {
            current_code: current.iter().filter(|k| k.kind() == ArtifactKind::Code).count(),
            current_build: current.contains(&ArtifactKey::Build),
            current_variability: current.contains(&ArtifactKey::Variability),
            previous: previous.len(),
            flagged_keys: self.flags.len(),
        })
    }

    // ------------------------------------------------------------------
    // Generation management
    // ------------------------------------------------------------------

    /// Drop PREVIOUS and every flag; CURRENT becomes the only generation.
    pub fn clear_history(&mut self) -> Result<()> {
        self.layout.reset(Area::Previous)?;
        self.layout.reset(Area::Baseline)?;
        self.flags.clear();
        self.flags.save(&self.layout.flags_path())?;

        info!("cleared store history");
        self.journal(JournalEntry::new(JournalAction::ClearHistory));
        Ok(())
    }

    /// Restore CURRENT to its state before this generation's changes.
    ///
    /// Keys flagged ADDITION are removed, every displaced key gets its
    /// generation-start value back, then history is cleared. Each step is
    /// idempotent, so a rollback interrupted by an I/O error can be re-run.
    pub fn rollback(&mut self) -> Result<()> {
        let added: BTreeSet<ArtifactKey> = ArtifactKind::ALL
            .into_iter()
            .flat_map(|kind| self.flags.keys_with(kind, ChangeFlag::Addition))
            .collect();

        for key in &added {
            remove_file_if_exists(self.layout.artifact_path(Area::Current, key))?;
        }

        let mut restored = 0usize;
        for key in self.layout.keys(Area::Previous)? {
            if added.contains(&key) {
                continue;
            }
            let current = self.layout.artifact_path(Area::Current, &key);
            let previous = self.layout.artifact_path(Area::Previous, &key);
            let baseline = self.layout.artifact_path(Area::Baseline, &key);

            if baseline.exists() {
                remove_file_if_exists(&previous)?;
                move_file(&baseline, &current)?;
            } else {
                move_file(&previous, &current)?;
            }
            restored += 1;
        }

        info!(removed = added.len(), restored, "rolled back store generation");
        self.journal(
            JournalEntry::new(JournalAction::Rollback)
                .with_details(json!({ "removed": added.len(), "restored": restored })),
        );
        self.clear_history()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Move CURRENT to PREVIOUS, preserving the generation-start value.
    ///
    /// Returns whether the old PREVIOUS value was moved into the baseline.
    fn displace(&self, key: &ArtifactKey) -> Result<bool> {
        let current = self.layout.artifact_path(Area::Current, key);
        let previous = self.layout.artifact_path(Area::Previous, key);
        let baseline = self.layout.artifact_path(Area::Baseline, key);

        let baselined = previous.exists()
            && !baseline.exists()
            && !self.flags.has(key, ChangeFlag::Addition);
        if baselined {
            move_file(&previous, &baseline)?;
        }
        move_file(&current, &previous)?;
        Ok(baselined)
    }

    fn commit_staged(&mut self, staged: StagedFile) -> Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_commit) {
            drop(staged);
            return Err(VariError::Io("staged artifact was not committed".to_string()));
        }
        staged.commit()
    }

    /// Best-effort reversal of [`Self::displace`] after a failed write.
    ///
    /// If a move here fails too, the value stays recoverable from PREVIOUS
    /// (or the baseline) and the failure is logged; the original write error
    /// is what the caller sees.
    fn undo_displace(&self, key: &ArtifactKey, baselined: bool) {
        let current = self.layout.artifact_path(Area::Current, key);
        let previous = self.layout.artifact_path(Area::Previous, key);
        let baseline = self.layout.artifact_path(Area::Baseline, key);

        if let Err(err) = move_file(&previous, &current) {
            warn!(%key, error = %err, "failed to restore displaced artifact");
            return;
        }
        if baselined && let Err(err) = move_file(&baseline, &previous) {
            warn!(%key, error = %err, "failed to restore previous artifact from baseline");
        }
    }

    fn raise(&mut self, key: &ArtifactKey, flag: ChangeFlag) -> Result<()> {
        if self.flags.insert(key, flag) {
            self.flags.save(&self.layout.flags_path())?;
        }
        Ok(())
    }

    fn journal(&self, entry: JournalEntry) {
        if let Err(err) = append_entry(&self.layout.journal_path(), &entry) {
            warn!(error = %err, action = %entry.action, "failed to append store journal");
        }
    }
}

fn read_artifact(path: &Path, key: &ArtifactKey, generation: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(VariError::NotFound(format!(
            "{} has no {} value",
            key, generation
        ))),
        Err(e) => Err(VariError::Io(format!(
            "failed to read {} '{}': {}",
            key,
            path.display(),
            e
        ))),
    }
}
