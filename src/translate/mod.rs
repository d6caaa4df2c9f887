//! Line-number translation across one diff.
//!
//! Maps a line number of the old revision to the new revision (and back)
//! using only a file's [`LineRun`] sequence. Regions after the last hunk are
//! shifted by the net line delta of all hunks.
//!
//! A line that exists only on the source side (deleted when mapping forward,
//! added when mapping backward) has no counterpart. Such lines resolve to
//! [`LinePosition::Dropped`], whose `following` field is the first target line
//! after the removed block; [`map`] returns that line.

use crate::diff::{ChangeKind, DiffSet, LineKind, LineRun};
use crate::error::{Result, VariError};

/// Where a source line ended up in the target revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePosition {
    /// The line survives at this target line number.
    Kept(u32),
    /// The line was removed; `following` is the next target line after it.
    Dropped { following: u32 },
}

impl LinePosition {
    pub fn line(self) -> u32 {
        match self {
            LinePosition::Kept(line) => line,
            LinePosition::Dropped { following } => following,
        }
    }

    pub fn is_kept(self) -> bool {
        matches!(self, LinePosition::Kept(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    OldToNew,
    NewToOld,
}

impl Direction {
    fn in_source(self, kind: LineKind) -> bool {
        match self {
            Direction::OldToNew => kind.in_old(),
            Direction::NewToOld => kind.in_new(),
        }
    }

    fn in_target(self, kind: LineKind) -> bool {
        match self {
            Direction::OldToNew => kind.in_new(),
            Direction::NewToOld => kind.in_old(),
        }
    }
}

/// Locate an old-revision line (1-based) in the new revision.
pub fn locate(lines: &[LineRun], old_line: u32) -> LinePosition {
    walk(lines, old_line, Direction::OldToNew)
}

/// Map an old-revision line (1-based) to its new-revision line number.
///
/// Deleted lines map to the first new line after the deletion.
pub fn map(lines: &[LineRun], old_line: u32) -> u32 {
    locate(lines, old_line).line()
}

/// Locate a new-revision line (1-based) in the old revision.
pub fn locate_new_to_old(lines: &[LineRun], new_line: u32) -> LinePosition {
    walk(lines, new_line, Direction::NewToOld)
}

/// Map a new-revision line (1-based) back to the old revision.
///
/// Added lines map to the first old line after the insertion point.
pub fn map_new_to_old(lines: &[LineRun], new_line: u32) -> u32 {
    locate_new_to_old(lines, new_line).line()
}

fn walk(lines: &[LineRun], line: u32, direction: Direction) -> LinePosition {
    if line == 0 {
        return LinePosition::Kept(0);
    }

    let mut pos_source: u32 = 0;
    let mut pos_target: u32 = 0;

    for run in lines {
        let in_source = direction.in_source(run.kind);
        let in_target = direction.in_target(run.kind);
        if in_source {
            pos_source += run.count;
        }
        if in_target {
            pos_target += run.count;
        }

        if pos_source >= line {
            // The line lies inside this run; measure from the run's start.
            pos_source -= run.count;
            if in_target {
                pos_target -= run.count;
                return LinePosition::Kept(line - pos_source + pos_target);
            }
            return LinePosition::Dropped {
                following: pos_target + 1,
            };
        }
    }

    LinePosition::Kept(line - pos_source + pos_target)
}

/// Translates line numbers for every file of a parsed diff.
#[derive(Debug, Clone, Copy)]
pub struct LineTranslator<'a> {
    diff: &'a DiffSet,
}

impl<'a> LineTranslator<'a> {
    pub fn new(diff: &'a DiffSet) -> Self {
        Self { diff }
    }

    /// Locate `old_line` of `path` in the new revision.
    ///
    /// Files absent from the diff are unchanged, so lines map to themselves.
    /// Files that do not exist on the old side (additions) or the new side
    /// (deletions) cannot be translated and yield `NotFound`.
    pub fn locate(&self, path: &str, old_line: u32) -> Result<LinePosition> {
        let Some(entry) = self.diff.get(path) else {
            return Ok(LinePosition::Kept(old_line));
        };

        match entry.change_kind {
            ChangeKind::Modification => Ok(locate(&entry.lines, old_line)),
            ChangeKind::Deletion => Err(VariError::NotFound(format!(
                "'{}' was deleted; line {} has no new revision",
                path, old_line
            ))),
            ChangeKind::Addition => Err(VariError::NotFound(format!(
                "'{}' was added; it has no old revision",
                path
            ))),
        }
    }

    pub fn map(&self, path: &str, old_line: u32) -> Result<u32> {
        self.locate(path, old_line).map(LinePosition::line)
    }

    /// Locate `new_line` of `path` in the old revision.
    pub fn locate_reverse(&self, path: &str, new_line: u32) -> Result<LinePosition> {
        let Some(entry) = self.diff.get(path) else {
            return Ok(LinePosition::Kept(new_line));
        };

        match entry.change_kind {
            ChangeKind::Modification => Ok(locate_new_to_old(&entry.lines, new_line)),
            ChangeKind::Addition => Err(VariError::NotFound(format!(
                "'{}' was added; line {} has no old revision",
                path, new_line
            ))),
            ChangeKind::Deletion => Err(VariError::NotFound(format!(
                "'{}' was deleted; it has no new revision",
                path
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
