//! Core diff parsing logic.

use crate::error::{Result, VariError};
use tracing::debug;

use super::helpers::{HunkHeader, parse_diff_git_line, parse_hunk_header, parse_trailing_mode};
use super::types::{ChangeKind, DiffSet, FileChangeEntry, LineKind, LineRun};

const FILE_MARKER: &str = "diff --git ";
const NO_NEWLINE_MARKER: char = '\\';

/// Options controlling how hunk bodies are turned into line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Record the function-context text after a hunk's closing `@@` as one
    /// unmodified line at the start of the hunk. The line takes the last slot
    /// of the preceding gap; a hunk with no gap before it records nothing.
    pub header_context_as_line: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            header_context_as_line: true,
        }
    }
}

/// Unified diff parser producing a [`DiffSet`].
#[derive(Debug, Clone, Default)]
pub struct DiffParser {
    options: DiffOptions,
}

impl DiffParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DiffOptions {
        self.options
    }

    /// Parse a complete `git diff` document.
    ///
    /// Text before the first `diff --git` marker is ignored. Any malformed
    /// file section aborts the whole parse.
    pub fn parse(&self, diff_text: &str) -> Result<DiffSet> {
        let mut set = DiffSet::new();
        let mut section: Option<Section<'_>> = None;

        for (idx, line) in diff_text.lines().enumerate() {
            let line_no = idx + 1;
            if let Some(rest) = line.strip_prefix(FILE_MARKER) {
                if let Some(done) = section.take() {
                    self.finish_section(&mut set, done)?;
                }
                section = Some(Section::open(line_no, rest)?);
                continue;
            }
            if let Some(current) = section.as_mut() {
                current.body.push((line_no, line));
            }
        }

        if let Some(done) = section.take() {
            self.finish_section(&mut set, done)?;
        }

        debug!(files = set.len(), "parsed diff");
        Ok(set)
    }

    fn finish_section(&self, set: &mut DiffSet, section: Section<'_>) -> Result<()> {
        let marker_line = section.marker_line;
        let entry = self.parse_section(section)?;
        merge_entry(set, entry, marker_line)
    }

    fn parse_section(&self, section: Section<'_>) -> Result<FileChangeEntry> {
        let mut entry = FileChangeEntry::new(section.new_path.clone(), ChangeKind::Modification);
        let mut body = section.body.iter().copied().peekable();

        // Extended header: mode and index lines up to the first hunk or binary marker.
        while let Some(&(_, line)) = body.peek() {
            if line.starts_with("@@") {
                break;
            }
            body.next();

            if line.starts_with("new file mode") {
                entry.change_kind = ChangeKind::Addition;
                entry.permissions = parse_trailing_mode(line);
            } else if line.starts_with("deleted file mode") {
                entry.change_kind = ChangeKind::Deletion;
                entry.path = section.old_path.clone();
                entry.permissions = parse_trailing_mode(line);
            } else if line.starts_with("old mode") {
                entry.old_permissions = parse_trailing_mode(line);
            } else if line.starts_with("new mode") {
                entry.permissions = parse_trailing_mode(line);
            } else if line.starts_with("index ") {
                if entry.permissions.is_none() {
                    entry.permissions = parse_trailing_mode(line);
                }
            } else if line.starts_with("GIT binary patch") || line.starts_with("Binary files ") {
                entry.binary = true;
                return Ok(entry);
            }
        }

        let mut hunks = HunkWalker::new(self.options);
        for (line_no, line) in body {
            hunks.feed(line_no, line, &mut entry)?;
        }
        hunks.finish(section.marker_line, &mut entry)?;

        Ok(entry)
    }
}

/// Parse a diff document with default options.
pub fn parse_diff(diff_text: &str) -> Result<DiffSet> {
    DiffParser::new().parse(diff_text)
}

/// Lines belonging to one `diff --git` section.
struct Section<'a> {
    marker_line: usize,
    old_path: String,
    new_path: String,
    body: Vec<(usize, &'a str)>,
}

impl<'a> Section<'a> {
    fn open(marker_line: usize, rest: &str) -> Result<Self> {
        let (old_path, new_path) = parse_diff_git_line(rest).ok_or_else(|| {
            VariError::parse(
                marker_line,
                format!("cannot split the file paths of 'diff --git {}'", rest),
            )
        })?;
        Ok(Self {
            marker_line,
            old_path,
            new_path,
            body: Vec::new(),
        })
    }
}

/// Append a finished entry, folding git's delete+add idiom into one modification.
fn merge_entry(set: &mut DiffSet, entry: FileChangeEntry, marker_line: usize) -> Result<()> {
    if let Some(last) = set.last_mut()
        && last.path == entry.path
        && last.change_kind == ChangeKind::Deletion
        && entry.change_kind == ChangeKind::Addition
    {
        debug!(path = %entry.path, "coalescing deletion and addition");
        last.change_kind = ChangeKind::Modification;
        last.old_permissions = last.permissions.or(last.old_permissions);
        last.permissions = entry.permissions;
        last.lines.extend(entry.lines);
        last.no_trailing_newline = entry.no_trailing_newline;
        last.binary |= entry.binary;
        return Ok(());
    }

    if set.contains(&entry.path) {
        return Err(VariError::parse(
            marker_line,
            format!("duplicate diff section for '{}'", entry.path),
        ));
    }

    set.upsert(entry);
    Ok(())
}

/// Accumulates the current run and tracks hunk boundaries for one file.
struct HunkWalker {
    options: DiffOptions,
    run_kind: Option<LineKind>,
    run_lines: Vec<String>,
    previous_old_end: u32,
    remaining_old: u32,
    remaining_new: u32,
    open_hunk_line: Option<usize>,
}

impl HunkWalker {
    fn new(options: DiffOptions) -> Self {
        Self {
            options,
            run_kind: None,
            run_lines: Vec::new(),
            previous_old_end: 0,
            remaining_old: 0,
            remaining_new: 0,
            open_hunk_line: None,
        }
    }

    fn feed(&mut self, line_no: usize, line: &str, entry: &mut FileChangeEntry) -> Result<()> {
        if line.starts_with("@@") {
            self.check_complete()?;
            let header = parse_hunk_header(line).ok_or_else(|| {
                VariError::parse(line_no, format!("unparseable hunk header '{}'", line))
            })?;
            self.open_hunk(line_no, &header, entry);
            return Ok(());
        }

        if line.starts_with(NO_NEWLINE_MARKER) {
            entry.no_trailing_newline = true;
            return Ok(());
        }

        if self.is_complete() {
            // Trailer text after the last hunk (e.g. a format-patch signature).
            return Ok(());
        }

        let (kind, content) = match line.chars().next() {
            Some('+') => (LineKind::Added, &line[1..]),
            Some('-') => (LineKind::Deleted, &line[1..]),
            Some(' ') => (LineKind::Unmodified, &line[1..]),
            // Some tools strip the single space of blank context lines.
            None => (LineKind::Unmodified, ""),
            Some(_) => {
                return Err(VariError::parse(
                    line_no,
                    format!("unexpected line inside hunk: '{}'", line),
                ));
            }
        };

        let (old_step, new_step) = (u32::from(kind.in_old()), u32::from(kind.in_new()));
        if old_step > self.remaining_old || new_step > self.remaining_new {
            return Err(VariError::parse(
                line_no,
                "hunk body is longer than its header declares",
            ));
        }
        self.remaining_old -= old_step;
        self.remaining_new -= new_step;

        self.push_line(kind, content, entry);
        Ok(())
    }

    fn finish(&mut self, marker_line: usize, entry: &mut FileChangeEntry) -> Result<()> {
        self.check_complete().map_err(|e| match e {
            VariError::Parse { line, message } => VariError::parse(
                line,
                format!("{} (file section starting at line {})", message, marker_line),
            ),
            other => other,
        })?;
        self.flush(entry);
        Ok(())
    }

    fn open_hunk(&mut self, line_no: usize, header: &HunkHeader, entry: &mut FileChangeEntry) {
        self.flush(entry);

        let mut gap = header
            .old_body_start()
            .saturating_sub(1)
            .saturating_sub(self.previous_old_end);

        // The context line stands in for the last untouched line before the
        // hunk, so it is carved out of the gap and never adds a line.
        let context_line = self.options.header_context_as_line
            && !header.context.is_empty()
            && gap > 0;
        if context_line {
            gap -= 1;
        }
        if gap > 0 {
            entry.lines.push(LineRun::gap(gap));
        }
        self.previous_old_end = self.previous_old_end.max(header.old_end());
        self.remaining_old = header.old_count;
        self.remaining_new = header.new_count;
        self.open_hunk_line = Some(line_no);

        if context_line {
            self.push_line(LineKind::Unmodified, &header.context, entry);
        }
    }

    fn push_line(&mut self, kind: LineKind, content: &str, entry: &mut FileChangeEntry) {
        if self.run_kind != Some(kind) {
            self.flush(entry);
            self.run_kind = Some(kind);
        }
        self.run_lines.push(content.to_string());
    }

    fn flush(&mut self, entry: &mut FileChangeEntry) {
        let Some(kind) = self.run_kind.take() else {
            return;
        };
        if self.run_lines.is_empty() {
            return;
        }
        let count = self.run_lines.len() as u32;
        entry
            .lines
            .push(LineRun::new(kind, count, self.run_lines.join("\n")));
        self.run_lines.clear();
    }

    fn is_complete(&self) -> bool {
        self.remaining_old == 0 && self.remaining_new == 0
    }

    fn check_complete(&self) -> Result<()> {
        match self.open_hunk_line {
            Some(hunk_line) if !self.is_complete() => Err(VariError::parse(
                hunk_line,
                format!(
                    "truncated hunk: {} old and {} new lines missing",
                    self.remaining_old, self.remaining_new
                ),
            )),
            _ => Ok(()),
        }
    }
}
