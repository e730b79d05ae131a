//! Unified and side-by-side renderings of aligned rows.

use crate::lcs::{DiffEntry, DiffKind};
use serde::Serialize;

/// One row of a two-column view. Line numbers are 1-based and count only the
/// lines of their own side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideBySideRow<'a> {
    pub left_num: Option<usize>,
    pub left_line: Option<&'a str>,
    pub right_num: Option<usize>,
    pub right_line: Option<&'a str>,
    pub kind: DiffKind,
}

fn unified_line(entry: &DiffEntry<'_>) -> String {
    let marker = match entry.kind {
        DiffKind::Added => '+',
        DiffKind::Removed => '-',
        DiffKind::Common => ' ',
    };
    format!("{marker} {}", entry.line())
}

/// Every row in document order: `+ line`, `- line`, or `  line` when unchanged.
pub fn to_unified_text(entries: &[DiffEntry<'_>]) -> String {
    entries
        .iter()
        .map(unified_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the `+`/`-` rows of [`to_unified_text`].
pub fn to_unified_changes(entries: &[DiffEntry<'_>]) -> String {
    entries
        .iter()
        .filter(|entry| entry.is_change())
        .map(unified_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_side_by_side_rows<'a>(entries: &[DiffEntry<'a>]) -> Vec<SideBySideRow<'a>> {
    let mut left_num = 0;
    let mut right_num = 0;

    entries
        .iter()
        .map(|entry| {
            let left = entry.left.map(|line| {
                left_num += 1;
                (left_num, line)
            });
            let right = entry.right.map(|line| {
                right_num += 1;
                (right_num, line)
            });
            SideBySideRow {
                left_num: left.map(|(num, _)| num),
                left_line: left.map(|(_, line)| line),
                right_num: right.map(|(num, _)| num),
                right_line: right.map(|(_, line)| line),
                kind: entry.kind,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcs::diff_lines;
    use serde_json::json;

    #[test]
    fn test_unified_text_marks_rows() {
        let entries = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(to_unified_text(&entries), "  a\n- b\n+ x\n  c");
        assert_eq!(to_unified_changes(&entries), "- b\n+ x");
    }

    #[test]
    fn test_unified_text_of_nothing_is_empty() {
        assert_eq!(to_unified_text(&[]), "");
        assert_eq!(to_unified_changes(&diff_lines("a", "a")), "");
    }

    #[test]
    fn test_side_by_side_numbers_each_column() {
        let entries = diff_lines("a\nb\nc", "a\nx\ny\nc");
        let rows = to_side_by_side_rows(&entries);

        let numbers: Vec<(Option<usize>, Option<usize>)> =
            rows.iter().map(|r| (r.left_num, r.right_num)).collect();
        assert_eq!(
            numbers,
            vec![
                (Some(1), Some(1)),
                (Some(2), None),
                (None, Some(2)),
                (None, Some(3)),
                (Some(3), Some(4)),
            ]
        );
        assert_eq!(rows[1].left_line, Some("b"));
        assert_eq!(rows[1].kind, DiffKind::Removed);
        assert_eq!(rows[4].right_line, Some("c"));
    }

    #[test]
    fn test_side_by_side_serializes_camel_case() {
        let entries = diff_lines("", "hostname X");
        let rows = to_side_by_side_rows(&entries);
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            json!([{
                "leftNum": null,
                "leftLine": null,
                "rightNum": 1,
                "rightLine": "hostname X",
                "kind": "added"
            }])
        );
    }
}
