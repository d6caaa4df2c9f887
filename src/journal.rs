//! Append-only journal of store mutations.
//!
//! Every mutating store operation appends one JSON object per line to
//! `journal.ndjson` under the store root.
//!
//! # Entry Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: write, delete, flag, clear_history, rollback
//! - `key`: Optional artifact key for key-specific entries
//! - `details`: Freeform object with action-specific details
//!
//! ```no_run
//! use varidelta::journal::{JournalAction, JournalEntry, append_entry};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let entry = JournalEntry::new(JournalAction::Rollback)
//!     .with_details(json!({"restored": 3}));
//! append_entry(Path::new(".varidelta/cache/journal.ndjson"), &entry)?;
//! # Ok::<(), varidelta::error::VariError>(())
//! ```

use crate::error::{Result, VariError};
use crate::store::ArtifactKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Store operations recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    Write,
    Delete,
    Flag,
    ClearHistory,
    Rollback,
}

impl std::fmt::Display for JournalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalAction::Write => f.pad("write"),
            JournalAction::Delete => f.pad("delete"),
            JournalAction::Flag => f.pad("flag"),
            JournalAction::ClearHistory => f.pad("clear_history"),
            JournalAction::Rollback => f.pad("rollback"),
        }
    }
}

/// One journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub ts: DateTime<Utc>,

    pub action: JournalAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ArtifactKey>,

    pub details: Value,
}

impl JournalEntry {
    /// Create an entry stamped with the current time.
    pub fn new(action: JournalAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            key: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_key(mut self, key: &ArtifactKey) -> Self {
        self.key = Some(key.clone());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the entry to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            VariError::Serialization(format!("failed to serialize journal entry: {}", e))
        })
    }
}

/// Append an entry to the journal file, creating it if needed.
pub fn append_entry(path: &Path, entry: &JournalEntry) -> Result<()> {
    let json_line = entry.to_ndjson_line()?;

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            VariError::Io(format!(
                "failed to create journal directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            VariError::Io(format!(
                "failed to open journal '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            VariError::Io(format!(
                "failed to append to journal '{}': {}",
                path.display(),
                e
            ))
        })
}

/// Read every entry of a journal; a missing journal is empty.
pub fn read_journal(path: &Path) -> Result<Vec<JournalEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        VariError::Io(format!(
            "failed to read journal '{}': {}",
            path.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                VariError::Serialization(format!(
                    "invalid journal entry {} in '{}': {}",
                    idx + 1,
                    path.display(),
                    e
                ))
            })
        })
        .collect()
}
