//! Answer critique: the three leaf detectors and the quality scorer.
//!
//! - [`fallacy::FallacyDetector`]: named fallacy patterns with negative guards
//! - [`citation::CitationAnalyzer`]: proximity-based citation support
//! - [`bias::BiasDetector`]: stance-marker imbalance
//! - [`scoring::QualityScorer`]: single-step penalty sum and clamp
//!
//! The detectors are independent of each other; each reads only its own
//! inputs and returns an owned result, so they can run concurrently.

pub mod bias;
pub mod citation;
pub mod entities;
pub mod fallacy;
pub mod guard;
pub mod scoring;
pub mod text;

pub use bias::{BiasConfig, BiasDetector, BiasTally};
pub use citation::{CitationAnalysis, CitationAnalyzer, CitationConfig};
pub use entities::{
    BiasDirection, BiasWarning, Critique, DetectorKind, FallacyType, FallacyWarning,
    ScoreBreakdown, Severity, WeakCitation, WeaknessReason,
};
pub use fallacy::{FallacyDetector, FallacyRule, FallacyRuleConfig, builtin_rules};
pub use guard::Guard;
pub use scoring::{QualityScorer, ScoringConfig};
