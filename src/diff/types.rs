//! Data model produced by the diff parser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a file changed between the two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Addition,
    Deletion,
    Modification,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Addition => f.pad("addition"),
            ChangeKind::Deletion => f.pad("deletion"),
            ChangeKind::Modification => f.pad("modification"),
        }
    }
}

/// Verdict of a variability classifier for one file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariabilityChange {
    Change,
    NoChange,
    NotAVariabilityFile,
    /// No classifier has looked at the entry yet.
    #[default]
    NotAnalyzed,
}

impl fmt::Display for VariabilityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariabilityChange::Change => f.pad("change"),
            VariabilityChange::NoChange => f.pad("no_change"),
            VariabilityChange::NotAVariabilityFile => f.pad("not_a_variability_file"),
            VariabilityChange::NotAnalyzed => f.pad("not_analyzed"),
        }
    }
}

/// Classification of a run of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Added,
    Deleted,
    Unmodified,
    /// Old-file lines between hunks that the diff does not quote.
    Gap,
}

impl LineKind {
    /// Whether lines of this kind exist in the old revision.
    pub fn in_old(self) -> bool {
        matches!(self, LineKind::Deleted | LineKind::Unmodified | LineKind::Gap)
    }

    /// Whether lines of this kind exist in the new revision.
    pub fn in_new(self) -> bool {
        matches!(self, LineKind::Added | LineKind::Unmodified | LineKind::Gap)
    }
}

/// A maximal run of consecutive lines sharing one [`LineKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRun {
    pub kind: LineKind,
    /// Number of lines in the run; never zero for parsed runs.
    pub count: u32,
    /// Newline-joined line text without the diff marker; empty for gaps.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl LineRun {
    pub fn new(kind: LineKind, count: u32, content: impl Into<String>) -> Self {
        Self {
            kind,
            count,
            content: content.into(),
        }
    }

    pub fn gap(count: u32) -> Self {
        Self::new(LineKind::Gap, count, String::new())
    }
}

/// POSIX permission bits taken from a git mode line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u32);

impl Permissions {
    /// Parse a 3 or 4 digit octal string such as `644` or `0755`.
    pub fn from_octal(digits: &str) -> Option<Self> {
        if !(3..=4).contains(&digits.len()) || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b))
        {
            return None;
        }
        u32::from_str_radix(digits, 8).ok().map(Self)
    }

    pub fn mode(self) -> u32 {
        self.0
    }

    pub fn is_executable(self) -> bool {
        self.0 & 0o111 != 0
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.0)
    }
}

/// Change description of one file in a parsed diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeEntry {
    /// Repository-relative path with forward slashes.
    pub path: String,
    pub change_kind: ChangeKind,
    /// Destination permissions, if the diff header carried a mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    /// Source permissions from an `old mode` line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_permissions: Option<Permissions>,
    pub lines: Vec<LineRun>,
    #[serde(default)]
    pub no_trailing_newline: bool,
    /// Body was a binary patch; `lines` is empty.
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub variability_change: VariabilityChange,
}

impl FileChangeEntry {
    pub fn new(path: impl Into<String>, change_kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            change_kind,
            permissions: None,
            old_permissions: None,
            lines: Vec::new(),
            no_trailing_newline: false,
            binary: false,
            variability_change: VariabilityChange::NotAnalyzed,
        }
    }

    /// Lines of the old revision covered by the runs.
    pub fn old_line_count(&self) -> u32 {
        self.count_where(LineKind::in_old)
    }

    /// Lines of the new revision covered by the runs.
    pub fn new_line_count(&self) -> u32 {
        self.count_where(LineKind::in_new)
    }

    pub fn added_lines(&self) -> u32 {
        self.count_where(|k| k == LineKind::Added)
    }

    pub fn deleted_lines(&self) -> u32 {
        self.count_where(|k| k == LineKind::Deleted)
    }

    /// Iterate over the text of every added and deleted line.
    pub fn changed_content(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|run| matches!(run.kind, LineKind::Added | LineKind::Deleted))
            .flat_map(|run| run.content.split('\n'))
    }

    fn count_where(&self, pred: impl Fn(LineKind) -> bool) -> u32 {
        self.lines
            .iter()
            .filter(|run| pred(run.kind))
            .map(|run| run.count)
            .sum()
    }
}

/// Parsed diff: file entries keyed by path, in order of first appearance.
///
/// Serializes as a plain list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<FileChangeEntry>", try_from = "Vec<FileChangeEntry>")]
pub struct DiffSet {
    entries: Vec<FileChangeEntry>,
    /// Path -> position in `entries`.
    index: HashMap<String, usize>,
}

impl DiffSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileChangeEntry> {
        self.index.get(path).map(|&pos| &self.entries[pos])
    }

    /// Mutable access to one entry. The path itself must not be changed.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut FileChangeEntry> {
        self.index.get(path).map(|&pos| &mut self.entries[pos])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileChangeEntry> {
        self.entries.iter()
    }

    /// Entries in order. Paths must not be changed through these references.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FileChangeEntry> {
        self.entries.iter_mut()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn into_entries(self) -> Vec<FileChangeEntry> {
        self.entries
    }

    pub(super) fn last_mut(&mut self) -> Option<&mut FileChangeEntry> {
        self.entries.last_mut()
    }

    /// Append `entry`, or replace the entry with the same path in place.
    ///
    /// Returns the replaced entry.
    pub(super) fn upsert(&mut self, entry: FileChangeEntry) -> Option<FileChangeEntry> {
        match self.index.get(&entry.path) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], entry)),
            None => {
                self.index.insert(entry.path.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a DiffSet {
    type Item = &'a FileChangeEntry;
    type IntoIter = std::slice::Iter<'a, FileChangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Later entries replace earlier ones with the same path, keeping the first position.
impl FromIterator<FileChangeEntry> for DiffSet {
    fn from_iter<I: IntoIterator<Item = FileChangeEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.upsert(entry);
        }
        set
    }
}

impl From<DiffSet> for Vec<FileChangeEntry> {
    fn from(set: DiffSet) -> Self {
        set.entries
    }
}

impl TryFrom<Vec<FileChangeEntry>> for DiffSet {
    type Error = String;

    fn try_from(entries: Vec<FileChangeEntry>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for entry in entries {
            if let Some(previous) = set.upsert(entry) {
                return Err(format!("duplicate entry for '{}'", previous.path));
            }
        }
        Ok(set)
    }
}
