//! Rhetorical bias detection.
//!
//! Counts stance markers leaning apologetic or skeptical in the model's own
//! words. Quoted source material is removed first, and markers framed as
//! neutral reporting ("some scholars call it a legend") are discounted.

use super::entities::{BiasDirection, BiasWarning};
use super::text::{contains_phrase, find_phrase, strip_quoted, words};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const APOLOGETIC_MARKERS: &[&str] = &[
    "beyond any doubt",
    "beyond doubt",
    "clearly proves",
    "conclusively",
    "definitively proves",
    "historically certain",
    "incontrovertible",
    "indisputable",
    "irrefutable",
    "overwhelming evidence",
    "proves that",
    "unassailable",
    "undeniable",
    "undeniably",
    "unquestionably",
    "without question",
];

const SKEPTICAL_MARKERS: &[&str] = &[
    "contradiction",
    "contradictions",
    "contradictory",
    "debunked",
    "fabricated",
    "fabrication",
    "fictional",
    "forged",
    "forgery",
    "implausible",
    "invented",
    "later interpolation",
    "legend",
    "legendary",
    "myth",
    "mythical",
    "mythological",
    "no evidence",
    "pious fiction",
    "unhistorical",
    "unreliable",
];

const NEGATION_CUES: &[&str] = &[
    "aren't", "cannot", "hardly", "isn't", "neither", "never", "no", "nor", "not", "wasn't",
    "without",
];

const HEDGE_CUES: &[&str] = &[
    "according to",
    "alleged",
    "allegedly",
    "arguably",
    "claim",
    "claims",
    "critics argue",
    "debate whether",
    "debated whether",
    "dismissed as",
    "it is debated",
    "lack of",
    "may",
    "might",
    "possibly",
    "question of",
    "regarded as",
    "so-called",
    "some argue",
    "some critics",
    "some scholars",
    "whether",
];

/// Thresholds for emitting a bias warning.
///
/// The defaults are uncalibrated starting points chosen so that a single
/// emphatic phrase never triggers a warning on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    /// The dominant direction's weighted count must exceed this. At 2.0 an
    /// answer needs at least three unhedged markers leaning one way, so one
    /// or two strong words in an otherwise measured answer pass.
    pub threshold: f64,
    /// The dominant count must exceed the other direction by more than this.
    /// At 1.0 an answer that voices both sides about equally is treated as
    /// balanced even when both tallies are high.
    pub margin: f64,
    /// Words before a marker inspected for negation and hedging cues. Six
    /// covers "some scholars debate whether it is a ..." without reaching
    /// into the previous clause.
    pub cue_window_words: usize,
    /// Weight of a hedged marker. Reported views still lean the answer a
    /// little, so hedging discounts rather than erases the hit.
    pub hedge_weight: f64,
    /// Weight of a negated marker ("not a legend" asserts the opposite
    /// stance, which the tally does not try to infer).
    pub negation_weight: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            margin: 1.0,
            cue_window_words: 6,
            hedge_weight: 0.35,
            negation_weight: 0.0,
        }
    }
}

impl BiasConfig {
    // ==================== Builder Methods ====================

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.threshold < 0.0 {
            issues.push(format!("bias threshold cannot be negative (got {})", self.threshold));
        }
        if self.margin < 0.0 {
            issues.push(format!("bias margin cannot be negative (got {})", self.margin));
        }
        for (name, weight) in [
            ("hedge_weight", self.hedge_weight),
            ("negation_weight", self.negation_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                issues.push(format!("{} must be within 0.0..=1.0 (got {})", name, weight));
            }
        }
        issues
    }
}

#[derive(Debug, Clone)]
struct MarkerHit {
    start: usize,
    end: usize,
    direction: BiasDirection,
    term: &'static str,
}

/// Weighted stance-marker counts for one text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasTally {
    pub apologetic: f64,
    pub skeptical: f64,
    pub apologetic_terms: BTreeSet<String>,
    pub skeptical_terms: BTreeSet<String>,
}

/// Detects stance-marker imbalance.
#[derive(Debug, Clone, Default)]
pub struct BiasDetector {
    config: BiasConfig,
}

impl BiasDetector {
    pub fn new(config: BiasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BiasConfig {
        &self.config
    }

    /// Detect bias across the answer and its supporting reasoning.
    ///
    /// Returns at most one warning (for the dominant direction).
    pub fn detect(&self, answer_text: &str, reasoning_text: &str) -> Vec<BiasWarning> {
        let tally = self.tally(answer_text, reasoning_text);

        let (direction, dominant, other, terms) = if tally.apologetic >= tally.skeptical {
            (
                BiasDirection::TendsApologetic,
                tally.apologetic,
                tally.skeptical,
                tally.apologetic_terms,
            )
        } else {
            (
                BiasDirection::TendsSkeptical,
                tally.skeptical,
                tally.apologetic,
                tally.skeptical_terms,
            )
        };

        if dominant > self.config.threshold && dominant - other > self.config.margin {
            vec![BiasWarning {
                direction,
                strength: (dominant - other) / (dominant + other),
                triggering_terms: terms,
            }]
        } else {
            vec![]
        }
    }

    /// Weighted marker counts with quoted material excluded.
    pub fn tally(&self, answer_text: &str, reasoning_text: &str) -> BiasTally {
        let mut tally = BiasTally::default();
        for text in [answer_text, reasoning_text] {
            let own_words = strip_quoted(text).to_lowercase();
            for hit in find_hits(&own_words) {
                let weight = self.weight(&own_words, hit.start);
                if weight <= 0.0 {
                    continue;
                }
                let (count, terms) = match hit.direction {
                    BiasDirection::TendsApologetic => {
                        (&mut tally.apologetic, &mut tally.apologetic_terms)
                    }
                    BiasDirection::TendsSkeptical => {
                        (&mut tally.skeptical, &mut tally.skeptical_terms)
                    }
                };
                *count += weight;
                terms.insert(hit.term.to_string());
            }
        }
        tally
    }

    /// Weight of a marker given the words just before it.
    fn weight(&self, text: &str, marker_start: usize) -> f64 {
        let preceding = words(&text[..marker_start]);
        let window: Vec<&str> = preceding
            .iter()
            .rev()
            .take(self.config.cue_window_words)
            .rev()
            .map(|w| w.text)
            .collect();
        if window.iter().any(|w| NEGATION_CUES.contains(w)) {
            return self.config.negation_weight;
        }
        let window = window.join(" ");
        if HEDGE_CUES.iter().any(|cue| contains_phrase(&window, cue)) {
            return self.config.hedge_weight;
        }
        1.0
    }
}

/// Marker occurrences in lowercase text, overlapping hits of the same
/// direction collapsed to the earliest, longest one.
fn find_hits(text: &str) -> Vec<MarkerHit> {
    let mut hits = Vec::new();
    for (direction, vocabulary) in [
        (BiasDirection::TendsApologetic, APOLOGETIC_MARKERS),
        (BiasDirection::TendsSkeptical, SKEPTICAL_MARKERS),
    ] {
        for &term in vocabulary {
            for start in find_phrase(text, term) {
                hits.push(MarkerHit {
                    start,
                    end: start + term.len(),
                    direction,
                    term,
                });
            }
        }
    }

    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<MarkerHit> = Vec::new();
    for hit in hits {
        let overlaps = kept
            .iter()
            .any(|k| k.direction == hit.direction && hit.start < k.end && k.start < hit.end);
        if !overlaps {
            kept.push(hit);
        }
    }
    kept
}
