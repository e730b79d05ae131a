//! Set-difference diff.
//!
//! A cheaper, less precise substitute for the LCS alignment: a line counts as
//! removed when it appears nowhere in the new text and as added when it appears
//! nowhere in the old text. Moved lines are not detected and no ordering is
//! kept across the two sides.

use crate::lcs::split_lines;
use std::collections::HashSet;

/// Rendering of a [`SimpleDiff`] with no differences.
pub const NO_CHANGES: &str = "No textual changes detected.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleDiff<'a> {
    /// Old lines absent from the new text, in old document order
    pub removed: Vec<&'a str>,
    /// New lines absent from the old text, in new document order
    pub added: Vec<&'a str>,
}

impl SimpleDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// `- line` rows, then `+ line` rows, or [`NO_CHANGES`].
    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_CHANGES.to_string();
        }
        self.removed
            .iter()
            .map(|line| format!("- {line}"))
            .chain(self.added.iter().map(|line| format!("+ {line}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn simple_diff<'a>(old: &'a str, new: &'a str) -> SimpleDiff<'a> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let old_set: HashSet<&str> = old_lines.iter().copied().collect();
    let new_set: HashSet<&str> = new_lines.iter().copied().collect();

    SimpleDiff {
        removed: old_lines
            .iter()
            .copied()
            .filter(|line| !new_set.contains(line))
            .collect(),
        added: new_lines
            .iter()
            .copied()
            .filter(|line| !old_set.contains(line))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_set_difference() {
        let diff = simple_diff(
            "hostname R1\nntp server 1.1.1.1\n!",
            "hostname R1\n!\nlogging host 10.0.0.5",
        );
        assert_eq!(diff.removed, vec!["ntp server 1.1.1.1"]);
        assert_eq!(diff.added, vec!["logging host 10.0.0.5"]);
        assert_eq!(
            diff.render(),
            "- ntp server 1.1.1.1\n+ logging host 10.0.0.5"
        );
    }

    #[test]
    fn test_moved_lines_are_invisible() {
        let diff = simple_diff("a\nb\nc", "c\nb\na");
        assert!(diff.is_empty());
        assert_eq!(diff.render(), NO_CHANGES);
    }

    #[test]
    fn test_duplicates_each_reported() {
        let diff = simple_diff("x\n!\n!", "x");
        assert_eq!(diff.removed, vec!["!", "!"]);
    }

    #[test]
    fn test_blank_old_text_adds_every_line() {
        let diff = simple_diff("", "hostname X\nend");
        assert!(diff.removed.is_empty());
        assert_eq!(diff.added, vec!["hostname X", "end"]);
    }
}
