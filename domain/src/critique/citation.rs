//! Citation strength analysis.
//!
//! A citation counts as supported only when its snippet's content words show
//! up close to one of its own `[n]` markers. Words elsewhere in the answer do
//! not count: support is tied to where the citation is used.

use super::entities::{WeakCitation, WeaknessReason};
use super::text::{WordSpan, content_tokens, is_content_token, is_stopword, normalize_token, words};
use crate::answer::{Citation, CitationIssue, CitationMarker, citation_issues, find_markers};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tuning knobs for proximity-based support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Words before a marker that belong to its window
    pub window_words_before: usize,
    /// Words after a marker that belong to its window
    pub window_words_after: usize,
    /// Minimum share of snippet content tokens found in a window
    pub min_support_ratio: f64,
    /// Tokens shorter than this (in characters) are ignored
    pub min_token_len: usize,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            window_words_before: 20,
            window_words_after: 20,
            min_support_ratio: 0.25,
            min_token_len: 3,
        }
    }
}

impl CitationConfig {
    // ==================== Builder Methods ====================

    pub fn with_window(mut self, before: usize, after: usize) -> Self {
        self.window_words_before = before;
        self.window_words_after = after;
        self
    }

    pub fn with_min_support_ratio(mut self, ratio: f64) -> Self {
        self.min_support_ratio = ratio;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(0.0..=1.0).contains(&self.min_support_ratio) {
            issues.push(format!(
                "min_support_ratio must be within 0.0..=1.0 (got {})",
                self.min_support_ratio
            ));
        }
        if self.window_words_before == 0 && self.window_words_after == 0 {
            issues.push("citation window cannot be empty on both sides".to_string());
        }
        issues
    }
}

/// Weak citations plus the malformed entries left out of the analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationAnalysis {
    pub weak: Vec<WeakCitation>,
    pub issues: Vec<CitationIssue>,
}

/// Judges each citation by the text around its markers.
#[derive(Debug, Clone, Default)]
pub struct CitationAnalyzer {
    config: CitationConfig,
}

impl CitationAnalyzer {
    pub fn new(config: CitationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CitationConfig {
        &self.config
    }

    /// Citations insufficiently supported by the answer text.
    pub fn analyze(&self, answer_text: &str, citations: &[Citation]) -> Vec<WeakCitation> {
        self.analyze_with_issues(answer_text, citations).weak
    }

    /// Like [`analyze`](Self::analyze), also returning malformed citations.
    pub fn analyze_with_issues(&self, answer_text: &str, citations: &[Citation]) -> CitationAnalysis {
        let issues = citation_issues(citations);
        let markers = find_markers(answer_text);
        let spans = words(answer_text);

        let mut seen = HashSet::new();
        let mut weak = Vec::new();

        for citation in citations {
            if citation.index <= 0 || !seen.insert(citation.index) {
                continue;
            }
            if let Some(weakness) = self.assess(citation, &markers, &spans) {
                weak.push(weakness);
            }
        }

        CitationAnalysis { weak, issues }
    }

    fn assess(
        &self,
        citation: &Citation,
        markers: &[CitationMarker],
        spans: &[WordSpan<'_>],
    ) -> Option<WeakCitation> {
        let weak = |reason, support_ratio| {
            Some(WeakCitation {
                index: citation.index,
                reference: citation.reference_label(),
                reason,
                support_ratio,
            })
        };

        let snippet: HashSet<String> = content_tokens(&citation.snippet, self.config.min_token_len)
            .into_iter()
            .collect();
        if snippet.is_empty() {
            return weak(WeaknessReason::EmptySnippet, 0.0);
        }

        let own_markers: Vec<&CitationMarker> = markers
            .iter()
            .filter(|m| m.references(citation.index))
            .collect();
        if own_markers.is_empty() {
            return weak(WeaknessReason::NoMarker, 0.0);
        }

        let best = own_markers
            .iter()
            .map(|marker| {
                let window = self.window_tokens(marker, spans);
                let found = snippet.iter().filter(|t| window.contains(*t)).count();
                found as f64 / snippet.len() as f64
            })
            .fold(0.0_f64, f64::max);

        if best >= self.config.min_support_ratio {
            None
        } else {
            weak(WeaknessReason::InsufficientSupport, best)
        }
    }

    /// Content tokens within the word window around one marker.
    fn window_tokens(&self, marker: &CitationMarker, spans: &[WordSpan<'_>]) -> HashSet<String> {
        let before = spans
            .iter()
            .filter(|w| w.end <= marker.start)
            .rev()
            .take(self.config.window_words_before);
        let after = spans
            .iter()
            .filter(|w| w.start >= marker.end)
            .take(self.config.window_words_after);

        before
            .chain(after)
            .filter(|w| !is_stopword(&w.text.to_lowercase()))
            .map(|w| normalize_token(w.text))
            .filter(|t| is_content_token(t, self.config.min_token_len))
            .collect()
    }
}
