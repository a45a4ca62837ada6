//! Revision loop policy.

use serde::{Deserialize, Serialize};

/// Score at or above which an answer is accepted without revision.
pub const REVISION_QUALITY_THRESHOLD: u8 = 70;

/// Upper bound on generation calls per request.
pub const MAX_ATTEMPTS: usize = 2;

/// Approximate token budget for one revision prompt.
pub const REVISION_TOKEN_BUDGET: usize = 3_000;

/// Controls when the orchestrator revises and how much it may spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionPolicy {
    pub quality_threshold: u8,
    pub max_attempts: usize,
    pub token_budget: usize,
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self {
            quality_threshold: REVISION_QUALITY_THRESHOLD,
            max_attempts: MAX_ATTEMPTS,
            token_budget: REVISION_TOKEN_BUDGET,
        }
    }
}

impl RevisionPolicy {
    // ==================== Builder Methods ====================

    pub fn with_quality_threshold(mut self, threshold: u8) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_token_budget(mut self, budget: usize) -> Self {
        self.token_budget = budget;
        self
    }

    /// Policy that never calls the generation collaborator.
    pub fn critique_only() -> Self {
        Self::default().with_max_attempts(0)
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.quality_threshold > 100 {
            issues.push(format!(
                "quality_threshold must be at most 100 (got {})",
                self.quality_threshold
            ));
        }
        if self.token_budget < 200 {
            issues.push(format!(
                "token_budget of {} cannot fit the fixed revision instructions",
                self.token_budget
            ));
        }
        issues
    }
}
