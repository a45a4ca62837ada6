//! Inline citation marker parsing.
//!
//! Answers reference their citations with bracketed indices: `[1]`, or a
//! grouped form `[2, 5]`. Anything else in brackets (`[sic]`, `[a]`) is not
//! a marker.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// `[n]` or `[n, m, ...]` with ASCII digits only.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([0-9]+(?:\s*,\s*[0-9]+)*)\s*\]").expect("marker pattern compiles")
});

/// A marker occurrence in answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    /// Indices referenced by this marker, in written order
    pub indices: Vec<i64>,
    /// Byte offset of the opening bracket
    pub start: usize,
    /// Byte offset one past the closing bracket
    pub end: usize,
}

impl CitationMarker {
    pub fn references(&self, index: i64) -> bool {
        self.indices.contains(&index)
    }
}

/// Find every citation marker in `text`, in order of appearance.
///
/// A marker whose index does not fit in an `i64` is skipped.
pub fn find_markers(text: &str) -> Vec<CitationMarker> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let indices = caps
                .get(1)?
                .as_str()
                .split(',')
                .map(|part| part.trim().parse::<i64>().ok())
                .collect::<Option<Vec<_>>>()?;
            Some(CitationMarker {
                indices,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// All distinct indices referenced anywhere in `text`.
pub fn referenced_indices(text: &str) -> BTreeSet<i64> {
    find_markers(text)
        .into_iter()
        .flat_map(|m| m.indices)
        .collect()
}
