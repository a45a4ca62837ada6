//! Quality scoring.
//!
//! Every penalty category is computed independently, summed into one total,
//! and the base score is reduced and clamped to `[0, 100]` exactly once.

use super::entities::{BiasWarning, FallacyType, FallacyWarning, ScoreBreakdown, Severity, WeakCitation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_BASE_SCORE: u8 = 100;
pub const HIGH_FALLACY_PENALTY: u32 = 15;
pub const MEDIUM_FALLACY_PENALTY: u32 = 8;
pub const LOW_FALLACY_PENALTY: u32 = 3;
pub const WEAK_CITATION_PENALTY: u32 = 5;
pub const BIAS_WARNING_PENALTY: u32 = 10;

/// Penalty weights for the quality score.
///
/// Passed to the scorer at construction; never read from globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: u8,
    pub high_fallacy_penalty: u32,
    pub medium_fallacy_penalty: u32,
    pub low_fallacy_penalty: u32,
    pub weak_citation_penalty: u32,
    pub bias_warning_penalty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: DEFAULT_BASE_SCORE,
            high_fallacy_penalty: HIGH_FALLACY_PENALTY,
            medium_fallacy_penalty: MEDIUM_FALLACY_PENALTY,
            low_fallacy_penalty: LOW_FALLACY_PENALTY,
            weak_citation_penalty: WEAK_CITATION_PENALTY,
            bias_warning_penalty: BIAS_WARNING_PENALTY,
        }
    }
}

impl ScoringConfig {
    pub fn fallacy_penalty(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high_fallacy_penalty,
            Severity::Medium => self.medium_fallacy_penalty,
            Severity::Low => self.low_fallacy_penalty,
        }
    }

    pub fn with_base_score(mut self, base_score: u8) -> Self {
        self.base_score = base_score;
        self
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.base_score > 100 {
            issues.push(format!("base_score must be at most 100 (got {})", self.base_score));
        }
        if self.high_fallacy_penalty < self.medium_fallacy_penalty
            || self.medium_fallacy_penalty < self.low_fallacy_penalty
        {
            issues.push("fallacy penalties must not decrease with severity".to_string());
        }
        issues
    }
}

/// Aggregates detector output into a bounded quality score.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Final score in `[0, 100]`.
    pub fn score(
        &self,
        base_score: i64,
        fallacies: &[FallacyWarning],
        weak_citations: &[WeakCitation],
        bias_warnings: &[BiasWarning],
    ) -> u8 {
        Self::score_from(&self.breakdown(base_score, fallacies, weak_citations, bias_warnings))
    }

    /// Clamped score for an already computed breakdown.
    pub fn score_from(breakdown: &ScoreBreakdown) -> u8 {
        Self::clamp(breakdown.base_score.saturating_sub(breakdown.total_penalty))
    }

    /// Per-category penalties, before the single clamp.
    pub fn breakdown(
        &self,
        base_score: i64,
        fallacies: &[FallacyWarning],
        weak_citations: &[WeakCitation],
        bias_warnings: &[BiasWarning],
    ) -> ScoreBreakdown {
        // One penalty per fallacy type, at the worst severity seen for it
        let mut worst: BTreeMap<FallacyType, Severity> = BTreeMap::new();
        for warning in fallacies {
            let entry = worst.entry(warning.fallacy_type).or_insert(warning.severity);
            *entry = (*entry).max(warning.severity);
        }
        let fallacy_penalty: i64 = worst
            .values()
            .map(|s| i64::from(self.config.fallacy_penalty(*s)))
            .sum();

        let weak_indices: BTreeSet<i64> = weak_citations.iter().map(|w| w.index).collect();
        let citation_penalty =
            weak_indices.len() as i64 * i64::from(self.config.weak_citation_penalty);

        let bias_penalty = bias_warnings.len() as i64 * i64::from(self.config.bias_warning_penalty);

        ScoreBreakdown {
            base_score,
            fallacy_penalty,
            citation_penalty,
            bias_penalty,
            total_penalty: fallacy_penalty
                .saturating_add(citation_penalty)
                .saturating_add(bias_penalty),
        }
    }

    fn clamp(value: i64) -> u8 {
        value.clamp(0, 100) as u8
    }
}
