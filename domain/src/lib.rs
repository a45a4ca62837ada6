//! Domain layer for answer-critique
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns, and
//! none of it performs I/O.
//!
//! # Core Concepts
//!
//! ## Answer
//!
//! A generated summary plus an ordered list of [`Citation`]s. The summary
//! references citations with `[n]` markers.
//!
//! ## Critique
//!
//! Three independent detectors inspect an answer:
//!
//! - **Fallacy detection**: rule table of patterns with contextual guards
//! - **Citation strength**: snippet support near each citation's own markers
//! - **Bias detection**: weighted stance-marker tally
//!
//! The [`QualityScorer`] folds their findings into a single 0-100 score.
//!
//! ## Revision
//!
//! A small state machine ([`RevisionState`]) decides whether a low-scoring
//! answer is sent back for a bounded number of revision attempts.

pub mod answer;
pub mod config;
pub mod core;
pub mod critique;
pub mod prompt;
pub mod revision;

// Re-export commonly used types
pub use answer::{Answer, Citation, CitationIssue, CitationIssueKind, CitationMarker};
pub use config::OutputFormat;
pub use core::{
    error::{DetectorError, DomainError},
    question::Question,
};
pub use critique::{
    BiasConfig, BiasDetector, BiasDirection, BiasWarning, CitationAnalysis, CitationAnalyzer,
    CitationConfig, Critique, DetectorKind, FallacyDetector, FallacyRule, FallacyRuleConfig,
    FallacyType, FallacyWarning, Guard, QualityScorer, ScoreBreakdown, ScoringConfig, Severity,
    WeakCitation, WeaknessReason,
};
pub use prompt::{RevisionPrompt, RevisionPromptBuilder};
pub use revision::{
    AcceptReason, AttemptOutcome, ExhaustReason, PendingAttempt, RevisionAttempt, RevisionEvent,
    RevisionOutcome, RevisionPolicy, RevisionState,
};
