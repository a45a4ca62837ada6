//! Answer and Citation entities.

use super::markers::referenced_indices;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A source passage backing part of an answer.
///
/// `index` is the number written in the answer's `[n]` markers. It is stable
/// across revisions: a revised answer refers to the same `Citation` values
/// through the same indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub index: i64,
    /// OSIS reference (e.g. `Eph.2.8-Eph.2.9`), blank for non-scripture sources
    #[serde(default)]
    pub osis: String,
    /// Human-readable anchor (e.g. `Ephesians 2:8-9` or a page number)
    #[serde(default)]
    pub anchor: String,
    /// Source excerpt the citation stands for
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Citation {
    pub fn new(index: i64, snippet: impl Into<String>) -> Self {
        Self {
            index,
            osis: String::new(),
            anchor: String::new(),
            snippet: snippet.into(),
            document_id: String::new(),
            passage_id: None,
            source_url: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_osis(mut self, osis: impl Into<String>) -> Self {
        self.osis = osis.into();
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = document_id.into();
        self
    }

    pub fn with_passage(mut self, passage_id: impl Into<String>) -> Self {
        self.passage_id = Some(passage_id.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// A label that is never blank: OSIS, then anchor, then `[index]`.
    pub fn reference_label(&self) -> String {
        if !self.osis.trim().is_empty() {
            self.osis.trim().to_string()
        } else if !self.anchor.trim().is_empty() {
            self.anchor.trim().to_string()
        } else {
            format!("[{}]", self.index)
        }
    }

    pub fn has_blank_snippet(&self) -> bool {
        self.snippet.trim().is_empty()
    }

    /// Problems visible on this citation alone. Duplicate indices need the
    /// whole list; see [`citation_issues`].
    pub fn validate(&self) -> Option<CitationIssueKind> {
        if self.index <= 0 {
            Some(CitationIssueKind::NonPositiveIndex)
        } else if self.has_blank_snippet() {
            Some(CitationIssueKind::BlankSnippet)
        } else {
            None
        }
    }
}

/// Why a citation was rejected as malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationIssueKind {
    NonPositiveIndex,
    DuplicateIndex,
    BlankSnippet,
}

impl CitationIssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationIssueKind::NonPositiveIndex => "non_positive_index",
            CitationIssueKind::DuplicateIndex => "duplicate_index",
            CitationIssueKind::BlankSnippet => "blank_snippet",
        }
    }

    /// Malformed citations of this kind are left out of strength analysis.
    ///
    /// A blank snippet is still analyzed (and always comes out weak); a bad
    /// or repeated index cannot be tied to a marker at all.
    pub fn excludes_from_analysis(&self) -> bool {
        !matches!(self, CitationIssueKind::BlankSnippet)
    }
}

/// A malformed citation found while validating an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationIssue {
    pub index: i64,
    pub kind: CitationIssueKind,
}

/// A generated answer: summary text plus the ordered citation list.
///
/// Immutable once created. A revision produces a new `Answer` through
/// [`Answer::with_revised_summary`], which keeps the citation list as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub summary: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Answer {
    pub fn new(summary: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            summary: summary.into(),
            citations,
        }
    }

    /// New answer with revised text and the same citations.
    pub fn with_revised_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            citations: self.citations.clone(),
        }
    }

    pub fn citation(&self, index: i64) -> Option<&Citation> {
        self.citations.iter().find(|c| c.index == index)
    }

    /// Indices referenced by markers in the summary.
    pub fn referenced_indices(&self) -> BTreeSet<i64> {
        referenced_indices(&self.summary)
    }

    /// Citations that the summary actually references, in citation order.
    pub fn referenced_citations(&self) -> Vec<&Citation> {
        let referenced = self.referenced_indices();
        self.citations
            .iter()
            .filter(|c| referenced.contains(&c.index))
            .collect()
    }

    /// Marker indices in the summary with no matching citation.
    pub fn dangling_indices(&self) -> BTreeSet<i64> {
        self.referenced_indices()
            .into_iter()
            .filter(|i| self.citation(*i).is_none())
            .collect()
    }

    /// Validate the citation list, returning every malformed entry.
    pub fn citation_issues(&self) -> Vec<CitationIssue> {
        citation_issues(&self.citations)
    }
}

/// Malformed entries in a citation list, in list order.
///
/// Only the second and later entries of a repeated index are reported as
/// duplicates; the first one stays usable.
pub fn citation_issues(citations: &[Citation]) -> Vec<CitationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for citation in citations {
        let kind = match citation.validate() {
            kind @ Some(CitationIssueKind::NonPositiveIndex) => kind,
            _ if !seen.insert(citation.index) => Some(CitationIssueKind::DuplicateIndex),
            other => other,
        };
        if let Some(kind) = kind {
            issues.push(CitationIssue {
                index: citation.index,
                kind,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eph_2_8() -> Citation {
        Citation::new(1, "For by grace you have been saved through faith")
            .with_osis("Eph.2.8")
            .with_anchor("Ephesians 2:8")
            .with_document("esv")
    }

    #[test]
    fn test_reference_label_fallbacks() {
        assert_eq!(eph_2_8().reference_label(), "Eph.2.8");
        assert_eq!(
            Citation::new(2, "x").with_anchor("p. 14").reference_label(),
            "p. 14"
        );
        assert_eq!(Citation::new(3, "x").with_osis("  ").reference_label(), "[3]");
    }

    #[test]
    fn test_revision_keeps_citations() {
        let original = Answer::new("Grace saves [1].", vec![eph_2_8()]);
        let revised = original.with_revised_summary("Salvation is by grace [1].");

        assert_eq!(original.summary, "Grace saves [1].");
        assert_eq!(revised.citations, original.citations);
        assert_eq!(revised.citation(1), original.citation(1));
    }

    #[test]
    fn test_referenced_citations_only() {
        let answer = Answer::new(
            "Grace saves [1].",
            vec![eph_2_8(), Citation::new(2, "unrelated")],
        );
        let referenced: Vec<_> = answer.referenced_citations().iter().map(|c| c.index).collect();
        assert_eq!(referenced, vec![1]);
    }

    #[test]
    fn test_validate_single_citation() {
        assert_eq!(eph_2_8().validate(), None);
        assert_eq!(
            Citation::new(0, "text").validate(),
            Some(CitationIssueKind::NonPositiveIndex)
        );
        assert_eq!(
            Citation::new(2, " \n").validate(),
            Some(CitationIssueKind::BlankSnippet)
        );
    }

    #[test]
    fn test_dangling_indices() {
        let answer = Answer::new("See [1] and [4].", vec![eph_2_8()]);
        assert_eq!(answer.dangling_indices().into_iter().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_citation_issues() {
        let answer = Answer::new(
            "text",
            vec![
                eph_2_8(),
                Citation::new(0, "zero index"),
                Citation::new(-2, "negative"),
                Citation::new(1, "duplicate"),
                Citation::new(5, "   "),
            ],
        );
        let kinds: Vec<_> = answer.citation_issues().iter().map(|i| (i.index, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, CitationIssueKind::NonPositiveIndex),
                (-2, CitationIssueKind::NonPositiveIndex),
                (1, CitationIssueKind::DuplicateIndex),
                (5, CitationIssueKind::BlankSnippet),
            ]
        );
        assert!(CitationIssueKind::DuplicateIndex.excludes_from_analysis());
        assert!(!CitationIssueKind::BlankSnippet.excludes_from_analysis());
    }

    #[test]
    fn test_deserialize_minimal_citation() {
        let json = r#"{"index": 2, "snippet": "In the beginning was the Word"}"#;
        let citation: Citation = serde_json::from_str(json).unwrap();
        assert_eq!(citation.index, 2);
        assert!(citation.osis.is_empty());
        assert!(citation.passage_id.is_none());
    }
}
