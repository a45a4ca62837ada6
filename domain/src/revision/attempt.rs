//! Audit records for the revision loop.

use super::state::RevisionState;
use crate::answer::Answer;
use crate::critique::Critique;
use serde::{Deserialize, Serialize};

/// How a single revision attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AttemptOutcome {
    /// The revised answer scored higher than the best so far
    Improved,
    /// The revised answer scored the same or lower
    NoImprovement,
    /// No revised answer was produced
    GenerationFailed { error: String },
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Improved => "improved",
            AttemptOutcome::NoImprovement => "no_improvement",
            AttemptOutcome::GenerationFailed { .. } => "generation_failed",
        }
    }
}

/// An attempt that has started but not yet returned.
///
/// Consumed by [`PendingAttempt::generated`] or [`PendingAttempt::failed`],
/// so an attempt is finalized exactly once.
#[derive(Debug, Clone)]
pub struct PendingAttempt {
    attempt_number: usize,
    input: Answer,
}

impl PendingAttempt {
    pub fn start(attempt_number: usize, input: Answer) -> Self {
        Self {
            attempt_number,
            input,
        }
    }

    pub fn attempt_number(&self) -> usize {
        self.attempt_number
    }

    pub fn input(&self) -> &Answer {
        &self.input
    }

    /// Finalize with a generated answer and its critique.
    ///
    /// `best_score` is the best score seen before this attempt.
    pub fn generated(self, output: Answer, critique: Critique, best_score: u8) -> RevisionAttempt {
        let outcome = if critique.quality_score() > best_score {
            AttemptOutcome::Improved
        } else {
            AttemptOutcome::NoImprovement
        };
        RevisionAttempt {
            attempt_number: self.attempt_number,
            input: self.input,
            output: Some(output),
            critique: Some(critique),
            outcome,
        }
    }

    pub fn failed(self, error: impl Into<String>) -> RevisionAttempt {
        RevisionAttempt {
            attempt_number: self.attempt_number,
            input: self.input,
            output: None,
            critique: None,
            outcome: AttemptOutcome::GenerationFailed {
                error: error.into(),
            },
        }
    }
}

/// Finalized record of one revision attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionAttempt {
    /// 1-based
    pub attempt_number: usize,
    pub input: Answer,
    pub output: Option<Answer>,
    pub critique: Option<Critique>,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl RevisionAttempt {
    pub fn improved(&self) -> bool {
        self.outcome == AttemptOutcome::Improved
    }

    pub fn score(&self) -> Option<u8> {
        self.critique.as_ref().map(Critique::quality_score)
    }
}

/// What the orchestrator hands back to the caller.
///
/// Always carries an answer and its critique, even when every revision
/// attempt failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionOutcome {
    pub answer: Answer,
    pub critique: Critique,
    /// Score of the answer as originally supplied
    pub initial_score: u8,
    pub attempts: Vec<RevisionAttempt>,
    pub final_state: RevisionState,
}

impl RevisionOutcome {
    pub fn revised(&self) -> bool {
        self.critique.revised()
    }

    pub fn final_score(&self) -> u8 {
        self.critique.quality_score()
    }

    pub fn attempts_made(&self) -> usize {
        self.attempts.len()
    }
}
