//! Answers under critique and the citations they reference.

pub mod entities;
pub mod markers;

pub use entities::{Answer, Citation, CitationIssue, CitationIssueKind, citation_issues};
pub use markers::{CitationMarker, find_markers, referenced_indices};
