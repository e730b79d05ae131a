//! Longest-common-subsequence alignment over lines.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Classification of an aligned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Line present on both sides
    Common,
    /// Line only in the new text
    Added,
    /// Line only in the old text
    Removed,
}

/// One aligned row: the old-side line, the new-side line, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffEntry<'a> {
    pub kind: DiffKind,
    pub left: Option<&'a str>,
    pub right: Option<&'a str>,
}

impl<'a> DiffEntry<'a> {
    pub fn common(line: &'a str) -> Self {
        Self {
            kind: DiffKind::Common,
            left: Some(line),
            right: Some(line),
        }
    }

    pub fn added(line: &'a str) -> Self {
        Self {
            kind: DiffKind::Added,
            left: None,
            right: Some(line),
        }
    }

    pub fn removed(line: &'a str) -> Self {
        Self {
            kind: DiffKind::Removed,
            left: Some(line),
            right: None,
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Common
    }

    /// The line this row shows, preferring the new side.
    pub fn line(&self) -> &'a str {
        self.right.or(self.left).unwrap_or_default()
    }
}

/// Row counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub common: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn of(entries: &[DiffEntry<'_>]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            match entry.kind {
                DiffKind::Common => stats.common += 1,
                DiffKind::Added => stats.added += 1,
                DiffKind::Removed => stats.removed += 1,
            }
            stats
        })
    }

    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Which input a diff error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("old"),
            Side::Right => f.write_str("new"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("{side} input is not text: {source}")]
    NotText {
        side: Side,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Split text into lines on `\n`.
///
/// `\r` is kept as line content so that joining the result with `\n` gives the
/// input back. Text that is blank after trimming has no lines at all.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

/// Align two texts line by line.
///
/// Runs in O(n·m) time and space. Among several minimal alignments the
/// backtrack prefers an `Added` row whenever the left neighbour scores at least
/// as high as the upper one, so in document order removals precede additions
/// at a changed spot.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffEntry<'a>> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let (n, m) = (old_lines.len(), new_lines.len());

    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if old_lines[i - 1] == new_lines[j - 1] {
                table[(i - 1) * width + j - 1] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + j - 1])
            };
        }
    }

    let mut entries = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            entries.push(DiffEntry::common(new_lines[j - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i * width + j - 1] >= table[(i - 1) * width + j]) {
            entries.push(DiffEntry::added(new_lines[j - 1]));
            j -= 1;
        } else {
            entries.push(DiffEntry::removed(old_lines[i - 1]));
            i -= 1;
        }
    }
    entries.reverse();
    entries
}

/// Borrow `bytes` as text, or report which side of a diff is not UTF-8.
pub fn decode_text(bytes: &[u8], side: Side) -> Result<&str, DiffError> {
    std::str::from_utf8(bytes).map_err(|source| DiffError::NotText { side, source })
}

/// Align two byte buffers, rejecting input that is not UTF-8 text.
pub fn diff_bytes<'a>(old: &'a [u8], new: &'a [u8]) -> Result<Vec<DiffEntry<'a>>, DiffError> {
    let old = decode_text(old, Side::Left)?;
    let new = decode_text(new, Side::Right)?;
    Ok(diff_lines(old, new))
}
