//! Fallacy detection.
//!
//! Each rule is a small data record `{pattern, severity, guard}` in a fixed,
//! ordered table. Raw matches are filtered through the rule's guard, merged
//! when they overlap, and collapsed to one [`FallacyWarning`] per type.

use super::entities::{FallacyType, FallacyWarning, Severity};
use super::guard::Guard;
use crate::core::error::DetectorError;
use crate::core::string::{squash_whitespace, truncate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Longest matched span carried in a warning.
const MAX_SPAN_LEN: usize = 160;

const CIRCULAR_AUTHORITY: &str = r"(?i)\b(?:scripture|the bible|the word of god|god's word|the church|the text)\b[^.!?]{0,60}?\b(?:is|are)\s+(?:true|authoritative|reliable|inerrant|infallible|trustworthy)\b[^.!?]{0,40}?\bbecause\b[^.!?]{0,60}?\b(?:it|scripture|the bible|the word of god|god's word|the church|the text)\s+(?:says|claims|teaches|declares|tells us|affirms)\b";

const AD_HOMINEM_PEOPLE: &str = r"(?i)\b(?:critics|skeptics|sceptics|scholars|atheists|liberals|fundamentalists|opponents|unbelievers|those who disagree)\b[^.!?]{0,40}?\b(?:are|is)\s+(?:simply\s+|just\s+|merely\s+|obviously\s+)?(?:foolish|ignorant|dishonest|deluded|stupid|wicked|blind|hostile|arrogant|biased)\b";

const AD_HOMINEM_FOOLS: &str = r"(?i)\bonly (?:a |an )?(?:fools?|idiots?|heretics?|the ignorant)\b[^.!?]{0,40}?\b(?:would|could|can|believe|deny|doubt|reject|think)\b";

const PROOF_TEXT_MARKERS: &str = r"(?:\[\d+(?:\s*,\s*\d+)*\][\s,;]*){3,}\[\d+(?:\s*,\s*\d+)*\]|\[\d+(?:\s*,\s*\d+){3,}\]";

const PROOF_TEXT_REFERENCES: &str = r"\b(?:[1-3]\s?)?[A-Z][a-z]{1,11}\.?\s\d{1,3}:\d{1,3}(?:[-\x{2013}]\d{1,3})?(?:[\s,;]+(?:and\s+)?(?:(?:[1-3]\s?)?[A-Z][a-z]{1,11}\.?\s)?\d{1,3}:\d{1,3}(?:[-\x{2013}]\d{1,3})?){3,}";

const FALSE_DICHOTOMY_EITHER: &str = r"(?i)\b(?:must|can only)\s+be\s+either\b[^.!?]{3,120}?\bor\b";

const FALSE_DICHOTOMY_NO_MIDDLE: &str = r"(?i)\b(?:only two (?:options|possibilities|choices|alternatives)|there is no (?:other|third|middle) (?:option|way|ground|alternative|possibility))\b";

const FALSE_DICHOTOMY_ULTIMATUM: &str = r"(?i)\bif (?:you|one) (?:do not|don't|does not|doesn't) (?:accept|believe)\b[^.!?]{3,80}?\b(?:you|one) (?:must|cannot)\b";

const AFFIRMING_CONSEQUENT: &str = r"(?i)\bif\b[^.!?;]{3,120}?\bthen\b[^.!?;]{3,120}[.;]\s*[^.!?]{0,160}?\b(?:therefore|thus|hence|it follows that)\b[^.!?;]{0,120}";

const APPEAL_TO_POPULARITY: &str = r"(?i)\b(?:everyone|everybody) (?:knows|agrees|accepts)\b|\ball (?:true |real |serious |honest )?(?:christians|believers|scholars|theologians) (?:know|agree|accept|believe)\b|\bmost people (?:believe|agree|accept)\b|\bit is (?:universally|widely) (?:accepted|agreed|acknowledged)\b|\bno (?:serious|credible|honest) (?:scholar|theologian|historian)s? (?:doubts?|denies|deny|questions?)\b";

/// A fallacy rule supplied through configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallacyRuleConfig {
    /// One of the [`FallacyType`] names (e.g. `ad_hominem`)
    pub fallacy_type: String,
    pub pattern: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guard: Guard,
}

/// One entry in the detector's rule table.
#[derive(Debug, Clone)]
pub struct FallacyRule {
    fallacy_type: FallacyType,
    severity: Severity,
    description: String,
    pattern: Regex,
    guard: Guard,
}

impl FallacyRule {
    pub fn new(
        fallacy_type: FallacyType,
        severity: Severity,
        pattern: &str,
        guard: Guard,
    ) -> Result<Self, DetectorError> {
        let pattern = Regex::new(pattern).map_err(|e| DetectorError::InvalidPattern {
            rule: fallacy_type.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            fallacy_type,
            severity,
            description: default_description(fallacy_type).to_string(),
            pattern,
            guard,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn from_config(config: &FallacyRuleConfig) -> Result<Self, DetectorError> {
        let fallacy_type: FallacyType = config
            .fallacy_type
            .parse()
            .map_err(|_| DetectorError::UnknownFallacyType(config.fallacy_type.clone()))?;
        let rule = Self::new(fallacy_type, config.severity, &config.pattern, config.guard)?;
        Ok(match &config.description {
            Some(description) => rule.with_description(description.clone()),
            None => rule,
        })
    }

    pub fn fallacy_type(&self) -> FallacyType {
        self.fallacy_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    /// Match ranges that survive this rule's guard.
    pub fn find(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern
            .find_iter(text)
            .map(|m| m.range())
            .filter(|range| !self.guard.suppresses(text, range.clone()))
            .collect()
    }
}

fn default_description(fallacy_type: FallacyType) -> &'static str {
    match fallacy_type {
        FallacyType::CircularAuthority => {
            "Grounds the authority of a source in that same source's claim about itself."
        }
        FallacyType::AdHominem => {
            "Dismisses a position by disparaging the people who hold it rather than engaging it."
        }
        FallacyType::ProofTexting => {
            "Stacks citations as the sole support for a claim without explaining how they bear on it."
        }
        FallacyType::FalseDichotomy => {
            "Presents two positions as the only options while others are available."
        }
        FallacyType::AffirmingTheConsequent => {
            "Infers the condition of an if/then claim from its consequence."
        }
        FallacyType::AppealToPopularity => {
            "Treats broad agreement as proof instead of giving the reasons for it."
        }
    }
}

/// The built-in rule table, in evaluation order.
pub fn builtin_rules() -> Result<Vec<FallacyRule>, DetectorError> {
    use FallacyType::*;
    use Severity::*;

    Ok(vec![
        FallacyRule::new(CircularAuthority, High, CIRCULAR_AUTHORITY, Guard::Attribution)?,
        FallacyRule::new(AdHominem, High, AD_HOMINEM_PEOPLE, Guard::Attribution)?,
        FallacyRule::new(AdHominem, High, AD_HOMINEM_FOOLS, Guard::Attribution)?,
        FallacyRule::new(ProofTexting, Medium, PROOF_TEXT_MARKERS, Guard::CitationSurvey)?,
        FallacyRule::new(ProofTexting, Medium, PROOF_TEXT_REFERENCES, Guard::CitationSurvey)?,
        FallacyRule::new(FalseDichotomy, Medium, FALSE_DICHOTOMY_EITHER, Guard::Attribution)?,
        FallacyRule::new(FalseDichotomy, Medium, FALSE_DICHOTOMY_NO_MIDDLE, Guard::Attribution)?,
        FallacyRule::new(FalseDichotomy, Medium, FALSE_DICHOTOMY_ULTIMATUM, Guard::Attribution)?,
        FallacyRule::new(
            AffirmingTheConsequent,
            Medium,
            AFFIRMING_CONSEQUENT,
            Guard::ConsequentNotAffirmed,
        )?,
        FallacyRule::new(AppealToPopularity, Low, APPEAL_TO_POPULARITY, Guard::Attribution)?,
    ])
}

struct Occurrence {
    range: Range<usize>,
    severity: Severity,
    description: String,
}

/// Scans text for fallacy patterns.
#[derive(Debug, Clone)]
pub struct FallacyDetector {
    rules: Vec<FallacyRule>,
}

impl FallacyDetector {
    /// Detector with the built-in rule table.
    pub fn new() -> Result<Self, DetectorError> {
        Ok(Self::with_rules(builtin_rules()?))
    }

    pub fn with_rules(rules: Vec<FallacyRule>) -> Self {
        Self { rules }
    }

    /// Built-in rules followed by rules from configuration.
    pub fn with_custom_rules(custom: &[FallacyRuleConfig]) -> Result<Self, DetectorError> {
        let mut rules = builtin_rules()?;
        for config in custom {
            rules.push(FallacyRule::from_config(config)?);
        }
        Ok(Self::with_rules(rules))
    }

    pub fn rules(&self) -> &[FallacyRule] {
        &self.rules
    }

    /// Detect fallacies, one warning per fallacy type.
    ///
    /// Output is ordered by severity (highest first), then by type.
    pub fn detect(&self, text: &str) -> Vec<FallacyWarning> {
        let mut by_type: BTreeMap<FallacyType, Vec<Occurrence>> = BTreeMap::new();

        for rule in &self.rules {
            for range in rule.find(text) {
                by_type.entry(rule.fallacy_type).or_default().push(Occurrence {
                    range,
                    severity: rule.severity,
                    description: rule.description.clone(),
                });
            }
        }

        let mut warnings: Vec<FallacyWarning> = by_type
            .into_iter()
            .filter_map(|(fallacy_type, occurrences)| collapse(text, fallacy_type, occurrences))
            .collect();

        warnings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.fallacy_type.cmp(&b.fallacy_type))
        });
        warnings
    }
}

/// Merge overlapping occurrences and fold them into one warning.
fn collapse(
    text: &str,
    fallacy_type: FallacyType,
    mut occurrences: Vec<Occurrence>,
) -> Option<FallacyWarning> {
    occurrences.sort_by_key(|o| (o.range.start, o.range.end));

    let mut merged: Vec<Range<usize>> = Vec::new();
    for occurrence in &occurrences {
        match merged.last_mut() {
            Some(last) if occurrence.range.start < last.end => {
                last.end = last.end.max(occurrence.range.end);
            }
            _ => merged.push(occurrence.range.clone()),
        }
    }

    let first = merged.first()?.clone();
    let strongest = occurrences.iter().max_by_key(|o| o.severity)?;

    Some(FallacyWarning {
        fallacy_type,
        severity: strongest.severity,
        matched_span: truncate(&squash_whitespace(&text[first]), MAX_SPAN_LEN),
        description: strongest.description.clone(),
        occurrence_count: merged.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> FallacyDetector {
        FallacyDetector::new().unwrap()
    }

    fn types(warnings: &[FallacyWarning]) -> Vec<FallacyType> {
        warnings.iter().map(|w| w.fallacy_type).collect()
    }

    #[test]
    fn test_builtin_rules_compile() {
        let rules = builtin_rules().unwrap();
        assert_eq!(rules.len(), 10);
        for fallacy_type in FallacyType::ALL {
            assert!(rules.iter().any(|r| r.fallacy_type() == fallacy_type));
        }
    }

    #[test]
    fn test_clean_text_has_no_warnings() {
        let text = "Paul teaches that salvation is by grace through faith [1]. \
                    James stresses that genuine faith shows itself in works [2].";
        assert!(detector().detect(text).is_empty());
    }

    #[test]
    fn test_circular_authority() {
        let warnings = detector().detect("The Bible is true because the Bible says it is true.");
        assert_eq!(types(&warnings), vec![FallacyType::CircularAuthority]);
        assert_eq!(warnings[0].severity, Severity::High);
    }

    #[test]
    fn test_three_ad_hominem_sentences_collapse_to_one() {
        let text = "Skeptics are simply dishonest. Critics are blind to the evidence. \
                    Only fools would deny the resurrection.";
        let warnings = detector().detect(text);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].fallacy_type, FallacyType::AdHominem);
        assert_eq!(warnings[0].occurrence_count, 3);
        assert_eq!(warnings[0].matched_span, "Skeptics are simply dishonest");
    }

    #[test]
    fn test_overlapping_matches_count_once() {
        // Both ad hominem rules match inside the same clause
        let text = "Only fools, and critics are foolish, would deny it.";
        let warnings = detector().detect(text);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].occurrence_count, 1);
    }

    #[test]
    fn test_attributed_ad_hominem_suppressed() {
        let unattributed = "Critics of the old gods are ignorant.";
        assert_eq!(detector().detect(unattributed).len(), 1);

        let attributed = "Celsus argues that critics of the old gods are ignorant.";
        assert!(detector().detect(attributed).is_empty());
    }

    #[test]
    fn test_proof_texting_markers() {
        let warnings = detector().detect("Divorce is always forbidden [1] [2] [3] [4].");
        assert_eq!(types(&warnings), vec![FallacyType::ProofTexting]);
    }

    #[test]
    fn test_proof_texting_markers_before_non_ascii_whitespace() {
        for text in [
            "Tongues have ceased [1] [2] [3] [4]\u{2003}",
            "God hates divorce [1] [2] [3] [4]\u{00A0}always.",
            "Women must keep silent [1]; [2]; [3]; [4]\u{3000}\u{2014}full stop\u{3002}",
        ] {
            let warnings = detector().detect(text);
            assert_eq!(types(&warnings), vec![FallacyType::ProofTexting], "{text:?}");
            assert!(warnings[0].matched_span.ends_with("[4]"));
        }
    }

    #[test]
    fn test_non_ascii_text_keeps_every_finding() {
        let text = "Skeptics are simply dishonest. God hates divorce [1] [2] [3] [4]\u{00A0}always.";
        let warnings = detector().detect(text);
        assert_eq!(
            types(&warnings),
            vec![FallacyType::AdHominem, FallacyType::ProofTexting]
        );
    }

    #[test]
    fn test_proof_texting_grouped_marker() {
        let warnings = detector().detect("Tongues have ceased [1, 2, 3, 4].");
        assert_eq!(types(&warnings), vec![FallacyType::ProofTexting]);
    }

    #[test]
    fn test_proof_texting_verse_refs() {
        let warnings =
            detector().detect("Tithing is mandatory: Mal 3:10, Gen 14:20, Lev 27:30, Num 18:26.");
        assert_eq!(types(&warnings), vec![FallacyType::ProofTexting]);
    }

    #[test]
    fn test_survey_of_parallels_not_flagged() {
        let text = "Compare the parallel creation-through-word passages Gen 1:3, Ps 33:6, John 1:3, Heb 11:3.";
        assert!(detector().detect(text).is_empty());
    }

    #[test]
    fn test_false_dichotomy() {
        let warnings = detector()
            .detect("Jesus must be either a liar or the Son of God; there is no middle ground.");
        assert_eq!(types(&warnings), vec![FallacyType::FalseDichotomy]);
        assert_eq!(warnings[0].occurrence_count, 2);
    }

    #[test]
    fn test_affirming_the_consequent() {
        let text = "If God exists, then the universe has order. The universe clearly has order; therefore God exists.";
        let warnings = detector().detect(text);
        assert_eq!(types(&warnings), vec![FallacyType::AffirmingTheConsequent]);
    }

    #[test]
    fn test_modus_ponens_not_flagged() {
        let text = "If Christ rose, then our faith is not in vain. Christ rose; therefore our faith stands.";
        assert!(detector().detect(text).is_empty());
    }

    #[test]
    fn test_appeal_to_popularity_low() {
        let warnings = detector().detect("Everyone knows the Gospels were written early.");
        assert_eq!(types(&warnings), vec![FallacyType::AppealToPopularity]);
        assert_eq!(warnings[0].severity, Severity::Low);
    }

    #[test]
    fn test_warnings_ordered_by_severity() {
        let text = "Everyone knows this. Skeptics are dishonest.";
        let warnings = detector().detect(text);
        assert_eq!(
            types(&warnings),
            vec![FallacyType::AdHominem, FallacyType::AppealToPopularity]
        );
    }

    #[test]
    fn test_detection_is_idempotent() {
        let text = "Skeptics are dishonest. Everyone knows it [1] [2] [3] [4].";
        let d = detector();
        assert_eq!(d.detect(text), d.detect(text));
    }

    #[test]
    fn test_custom_rule_from_config() {
        let config = FallacyRuleConfig {
            fallacy_type: "appeal_to_popularity".to_string(),
            pattern: r"(?i)\bthe church has always taught\b".to_string(),
            severity: Severity::Medium,
            description: Some("Appeals to tradition as proof.".to_string()),
            guard: Guard::Attribution,
        };
        let d = FallacyDetector::with_custom_rules(&[config]).unwrap();
        let warnings = d.detect("The church has always taught this, so it stands.");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, Severity::Medium);
        assert_eq!(warnings[0].description, "Appeals to tradition as proof.");
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let config = FallacyRuleConfig {
            fallacy_type: "ad_hominem".to_string(),
            pattern: "(unclosed".to_string(),
            severity: Severity::High,
            description: None,
            guard: Guard::None,
        };
        assert!(matches!(
            FallacyDetector::with_custom_rules(&[config]),
            Err(DetectorError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_unknown_custom_type() {
        let config = FallacyRuleConfig {
            fallacy_type: "strawman".to_string(),
            pattern: "x".to_string(),
            severity: Severity::Low,
            description: None,
            guard: Guard::None,
        };
        assert_eq!(
            FallacyDetector::with_custom_rules(&[config]).unwrap_err(),
            DetectorError::UnknownFallacyType("strawman".to_string())
        );
    }
}
