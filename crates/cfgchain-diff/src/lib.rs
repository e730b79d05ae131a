//! Line-level structural diff for configuration texts.
//!
//! [`diff_lines`] aligns two texts with a longest-common-subsequence table and
//! yields one [`DiffEntry`] per aligned row. The rows can be rendered as a
//! unified `+`/`-` listing or as numbered side-by-side columns.
//! [`simple_diff`] is a cheaper set-difference substitute that does not align
//! the two sides.
//!
//! ```
//! use cfgchain_diff::{diff_lines, to_unified_text};
//!
//! let entries = diff_lines("hostname R1\n!", "hostname R2\n!");
//! assert_eq!(to_unified_text(&entries), "- hostname R1\n+ hostname R2\n  !");
//! ```

mod lcs;
mod render;
mod simple;

pub use lcs::{
    decode_text, diff_bytes, diff_lines, split_lines, DiffEntry, DiffError, DiffKind, DiffStats,
    Side,
};
pub use render::{to_side_by_side_rows, to_unified_changes, to_unified_text, SideBySideRow};
pub use simple::{simple_diff, SimpleDiff, NO_CHANGES};
