//! Critique entities: warnings produced by the detectors and the
//! aggregated [`Critique`] for one evaluation pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Severity tier of a fallacy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}. Valid: low, medium, high", s)),
        }
    }
}

/// Named pattern of flawed argumentative structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallacyType {
    /// "Scripture is true because scripture says so"
    CircularAuthority,
    /// Attacking the people holding a view instead of the view
    AdHominem,
    /// Piling up references as the sole support for a claim
    ProofTexting,
    /// Presenting two options as the only possibilities
    FalseDichotomy,
    /// "If A then B; B, therefore A"
    AffirmingTheConsequent,
    /// "Everyone agrees", "all true believers accept"
    AppealToPopularity,
}

impl FallacyType {
    pub const ALL: [FallacyType; 6] = [
        FallacyType::CircularAuthority,
        FallacyType::AdHominem,
        FallacyType::ProofTexting,
        FallacyType::FalseDichotomy,
        FallacyType::AffirmingTheConsequent,
        FallacyType::AppealToPopularity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FallacyType::CircularAuthority => "circular_authority",
            FallacyType::AdHominem => "ad_hominem",
            FallacyType::ProofTexting => "proof_texting",
            FallacyType::FalseDichotomy => "false_dichotomy",
            FallacyType::AffirmingTheConsequent => "affirming_the_consequent",
            FallacyType::AppealToPopularity => "appeal_to_popularity",
        }
    }

    /// Plain-language name used in revision prompts and console output.
    pub fn display_name(&self) -> &'static str {
        match self {
            FallacyType::CircularAuthority => "circular appeal to authority",
            FallacyType::AdHominem => "ad hominem",
            FallacyType::ProofTexting => "proof-texting",
            FallacyType::FalseDichotomy => "false dichotomy",
            FallacyType::AffirmingTheConsequent => "affirming the consequent",
            FallacyType::AppealToPopularity => "appeal to popularity",
        }
    }
}

impl std::fmt::Display for FallacyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FallacyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        FallacyType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown fallacy type: {}", s))
    }
}

/// One fallacy type detected in an answer.
///
/// All occurrences of the same type collapse into a single warning;
/// `occurrence_count` is diagnostic only and never multiplies the penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallacyWarning {
    pub fallacy_type: FallacyType,
    pub severity: Severity,
    /// Text of the first occurrence
    pub matched_span: String,
    pub description: String,
    pub occurrence_count: usize,
}

/// Why a citation was judged weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessReason {
    /// The answer never writes the citation's `[n]` marker
    NoMarker,
    /// The snippet is blank or has no content words
    EmptySnippet,
    /// Too few snippet words appear near any of the citation's markers
    InsufficientSupport,
}

impl WeaknessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaknessReason::NoMarker => "no_marker",
            WeaknessReason::EmptySnippet => "empty_snippet",
            WeaknessReason::InsufficientSupport => "insufficient_support",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            WeaknessReason::NoMarker => "cited but never referenced in the answer text",
            WeaknessReason::EmptySnippet => "the source excerpt is empty",
            WeaknessReason::InsufficientSupport => {
                "the text around its marker does not reflect the source excerpt"
            }
        }
    }
}

/// A citation whose use in the answer is not supported by its snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakCitation {
    pub index: i64,
    /// Never blank (see [`Citation::reference_label`](crate::Citation::reference_label))
    pub reference: String,
    pub reason: WeaknessReason,
    /// Best fraction of snippet content tokens found near a marker
    pub support_ratio: f64,
}

/// Which way the answer's rhetoric leans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiasDirection {
    TendsApologetic,
    TendsSkeptical,
}

impl BiasDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasDirection::TendsApologetic => "tends-apologetic",
            BiasDirection::TendsSkeptical => "tends-skeptical",
        }
    }
}

impl std::fmt::Display for BiasDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stance-marker imbalance in the answer and its reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasWarning {
    pub direction: BiasDirection,
    /// Normalized imbalance in (0, 1]
    pub strength: f64,
    pub triggering_terms: BTreeSet<String>,
}

/// The three independent detectors feeding a critique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Fallacy,
    Citation,
    Bias,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Fallacy => "fallacy",
            DetectorKind::Citation => "citation",
            DetectorKind::Bias => "bias",
        }
    }
}

/// Per-category penalties behind a quality score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: i64,
    pub fallacy_penalty: i64,
    pub citation_penalty: i64,
    pub bias_penalty: i64,
    pub total_penalty: i64,
}

/// Result of one evaluation pass over an answer.
///
/// Built once and never mutated; each revision round yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    quality_score: u8,
    fallacies: Vec<FallacyWarning>,
    weak_citations: Vec<WeakCitation>,
    bias_warnings: Vec<BiasWarning>,
    revised: bool,
    breakdown: ScoreBreakdown,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    degraded_detectors: Vec<DetectorKind>,
}

impl Critique {
    pub fn new(
        quality_score: u8,
        fallacies: Vec<FallacyWarning>,
        weak_citations: Vec<WeakCitation>,
        bias_warnings: Vec<BiasWarning>,
        breakdown: ScoreBreakdown,
    ) -> Self {
        Self {
            quality_score: quality_score.min(100),
            fallacies,
            weak_citations,
            bias_warnings,
            revised: false,
            breakdown,
            degraded_detectors: Vec::new(),
        }
    }

    /// Same critique, marked as describing a revised answer (or not).
    pub fn with_revised(self, revised: bool) -> Self {
        Self { revised, ..self }
    }

    /// Same critique, recording detectors that failed and contributed nothing.
    pub fn with_degraded(self, degraded_detectors: Vec<DetectorKind>) -> Self {
        Self {
            degraded_detectors,
            ..self
        }
    }

    // ==================== Accessors ====================

    pub fn quality_score(&self) -> u8 {
        self.quality_score
    }

    pub fn fallacies(&self) -> &[FallacyWarning] {
        &self.fallacies
    }

    pub fn weak_citations(&self) -> &[WeakCitation] {
        &self.weak_citations
    }

    pub fn bias_warnings(&self) -> &[BiasWarning] {
        &self.bias_warnings
    }

    pub fn revised(&self) -> bool {
        self.revised
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn degraded_detectors(&self) -> &[DetectorKind] {
        &self.degraded_detectors
    }

    /// True when no detector raised anything.
    pub fn is_clean(&self) -> bool {
        self.fallacies.is_empty() && self.weak_citations.is_empty() && self.bias_warnings.is_empty()
    }

    pub fn is_weak(&self, index: i64) -> bool {
        self.weak_citations.iter().any(|w| w.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallacy_type_parse() {
        assert_eq!("ad_hominem".parse::<FallacyType>(), Ok(FallacyType::AdHominem));
        assert_eq!("Ad-Hominem".parse::<FallacyType>(), Ok(FallacyType::AdHominem));
        assert_eq!(
            "false dichotomy".parse::<FallacyType>(),
            Ok(FallacyType::FalseDichotomy)
        );
        assert!("strawman".parse::<FallacyType>().is_err());
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_bias_direction_serde() {
        let json = serde_json::to_string(&BiasDirection::TendsApologetic).unwrap();
        assert_eq!(json, "\"tends-apologetic\"");
    }

    #[test]
    fn test_critique_is_immutable_value() {
        let critique = Critique::new(80, vec![], vec![], vec![], ScoreBreakdown::default());
        let revised = critique.clone().with_revised(true);
        assert!(!critique.revised());
        assert!(revised.revised());
        assert_eq!(revised.quality_score(), 80);
        assert!(revised.is_clean());
    }

    #[test]
    fn test_critique_caps_score() {
        let critique = Critique::new(250, vec![], vec![], vec![], ScoreBreakdown::default());
        assert_eq!(critique.quality_score(), 100);
    }
}
