//! Helper functions for diff parsing.

use regex::Regex;
use std::sync::LazyLock;

use super::types::Permissions;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$").expect("valid hunk regex")
});

/// Parsed `@@ -old_start,old_count +new_start,new_count @@ context` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct HunkHeader {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Text after the closing `@@`, without the separating space.
    pub context: String,
}

impl HunkHeader {
    /// First old-file line covered by the hunk body.
    ///
    /// Pure insertions (`old_count == 0`) name the line *after which* the new
    /// lines go, so their body starts one line later.
    pub fn old_body_start(&self) -> u32 {
        if self.old_count == 0 {
            self.old_start + 1
        } else {
            self.old_start
        }
    }

    /// Last old-file line covered by the hunk body.
    pub fn old_end(&self) -> u32 {
        (self.old_body_start() + self.old_count).saturating_sub(1)
    }
}

/// Parse a hunk header line.
///
/// Format: "@@ -old_start,old_len +new_start,new_len @@" or "@@ -old_start +new_start @@",
/// optionally followed by function context text. A missing length means 1.
///
/// Returns None if the line does not match the grammar.
pub(super) fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER.captures(line)?;

    let number = |idx: usize| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };

    let context = caps.get(5).map(|m| m.as_str()).unwrap_or_default();
    let context = context.strip_prefix(' ').unwrap_or(context);

    let header = HunkHeader {
        old_start: number(1)?,
        old_count: number(2)?,
        new_start: number(3)?,
        new_count: number(4)?,
        context: context.to_string(),
    };

    // old_body_start and old_end must stay within u32.
    let body_start = if header.old_count == 0 {
        header.old_start.checked_add(1)?
    } else {
        header.old_start
    };
    body_start.checked_add(header.old_count)?;
    Some(header)
}

/// Parse the file paths from the remainder of a "diff --git" line.
///
/// Handles various formats:
/// - "a/path/to/file b/path/to/file" (normal)
/// - "a/path with spaces b/path with spaces"
/// - `"a/caf\303\251.c" "b/caf\303\251.c"` (C-quoted; escapes are decoded)
///
/// Returns (old path, new path) or None if the paths cannot be split.
pub(super) fn parse_diff_git_line(rest: &str) -> Option<(String, String)> {
    let rest = rest.trim_end();

    if rest.starts_with('"') || rest.ends_with('"') {
        return parse_quoted_paths(rest);
    }

    // With --no-renames both sides name the same file, so the midpoint split
    // is exact even when the path itself contains " b/".
    let bytes = rest.len();
    if bytes % 2 == 1 {
        let mid = bytes / 2;
        if rest.as_bytes()[mid] == b' ' {
            let (a_part, b_part) = (&rest[..mid], &rest[mid + 1..]);
            if let (Some(a_path), Some(b_path)) =
                (a_part.strip_prefix("a/"), b_part.strip_prefix("b/"))
                && a_path == b_path
            {
                return Some((normalize_path(a_path), normalize_path(b_path)));
            }
        }
    }

    let b_pos = rest.rfind(" b/")?;
    let a_path = rest[..b_pos].strip_prefix("a/")?;
    let b_path = &rest[b_pos + 3..];
    Some((normalize_path(a_path), normalize_path(b_path)))
}

/// Split a `diff --git` remainder where at least one side is C-quoted.
///
/// git quotes each side on its own, so `"a/x" b/y` and `a/x "b/y"` both occur.
fn parse_quoted_paths(rest: &str) -> Option<(String, String)> {
    let (a_raw, b_part) = if rest.starts_with('"') {
        let (a_raw, remainder) = take_quoted(rest)?;
        (a_raw, remainder.strip_prefix(' ')?)
    } else {
        let b_pos = rest.rfind(" \"b/")?;
        (rest[..b_pos].to_string(), &rest[b_pos + 1..])
    };

    let b_raw = if b_part.starts_with('"') {
        let (b_raw, remainder) = take_quoted(b_part)?;
        if !remainder.is_empty() {
            return None;
        }
        b_raw
    } else {
        b_part.to_string()
    };

    let a_path = a_raw.strip_prefix("a/")?;
    let b_path = b_raw.strip_prefix("b/")?;
    Some((normalize_path(a_path), normalize_path(b_path)))
}

/// Decode one C-quoted token at the start of `s` (as written by git's
/// `core.quotePath`), returning the text and whatever follows the closing quote.
///
/// Octal escapes are raw bytes of a UTF-8 name; names that do not decode to
/// UTF-8 are rejected.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let text = String::from_utf8(out).ok()?;
                return Some((text, &s[i + 1..]));
            }
            b'\\' => {
                let escape = *bytes.get(i + 1)?;
                i += 2;
                let decoded = match escape {
                    b'0'..=b'7' => {
                        let digits = bytes.get(i - 1..i + 2)?;
                        if !digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                            return None;
                        }
                        i += 2;
                        let value = digits
                            .iter()
                            .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                        u8::try_from(value).ok()?
                    }
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    b'"' | b'\\' => escape,
                    _ => return None,
                };
                out.push(decoded);
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    None
}

/// Extract destination permissions from the trailing mode field of a header line.
///
/// Works for "index abc..def 100644", "new file mode 100755",
/// "deleted file mode 100644", and "new mode 100755". The last three digits
/// are the permission bits; a non-zero fourth digit (setuid/setgid/sticky)
/// is kept.
pub(super) fn parse_trailing_mode(line: &str) -> Option<Permissions> {
    let token = line.split_whitespace().last()?;
    if token.len() < 3 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let tail4 = &token[token.len().saturating_sub(4)..];
    let digits = if tail4.len() == 4 && !tail4.starts_with('0') {
        tail4
    } else {
        &token[token.len() - 3..]
    };
    Permissions::from_octal(digits)
}

/// Normalize a file path to use forward slashes.
///
/// This ensures consistent path keys regardless of the platform where the
/// diff was generated.
pub(crate) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
