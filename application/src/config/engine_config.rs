//! Engine configuration container.
//!
//! [`EngineConfig`] groups the detector, scoring, revision and generation
//! settings so the binary can hand a single value to the use cases.
//!
//! Use cases receive only the slices they need:
//!
//! | Type | Critique | Revise |
//! |------|----------|--------|
//! | `ScoringConfig` | Yes | via Critique |
//! | `CitationConfig` | Yes | via Critique |
//! | `BiasConfig` | Yes | via Critique |
//! | `FallacyRuleConfig` list | Yes | via Critique |
//! | `RevisionPolicy` | No | Yes |
//! | `GenerationParams` | No | Yes |

use crate::config::GenerationParams;
use crate::use_cases::revise_answer::ReviseAnswerInput;
use critique_domain::{
    Answer, BiasConfig, CitationConfig, FallacyRuleConfig, Question, RevisionPolicy, ScoringConfig,
};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    scoring: ScoringConfig,
    citation: CitationConfig,
    bias: BiasConfig,
    custom_rules: Vec<FallacyRuleConfig>,
    revision: RevisionPolicy,
    generation: GenerationParams,
}

impl EngineConfig {
    pub fn new(
        scoring: ScoringConfig,
        citation: CitationConfig,
        bias: BiasConfig,
        revision: RevisionPolicy,
    ) -> Self {
        Self {
            scoring,
            citation,
            bias,
            revision,
            ..Self::default()
        }
    }

    // ==================== Accessors ====================

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn citation(&self) -> &CitationConfig {
        &self.citation
    }

    pub fn bias(&self) -> &BiasConfig {
        &self.bias
    }

    pub fn custom_rules(&self) -> &[FallacyRuleConfig] {
        &self.custom_rules
    }

    pub fn revision(&self) -> &RevisionPolicy {
        &self.revision
    }

    pub fn generation(&self) -> &GenerationParams {
        &self.generation
    }

    // ==================== Builder Methods ====================

    pub fn with_custom_rules(mut self, rules: Vec<FallacyRuleConfig>) -> Self {
        self.custom_rules = rules;
        self
    }

    pub fn with_revision(mut self, revision: RevisionPolicy) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    /// Disable revision: critique only, never call the generator.
    pub fn critique_only(mut self) -> Self {
        self.revision = self.revision.with_max_attempts(0);
        self
    }

    // ==================== Validation ====================

    /// Every problem across all sections, prefixed with the section name.
    pub fn validate(&self) -> Vec<String> {
        let sections = [
            ("scoring", self.scoring.validate()),
            ("citation", self.citation.validate()),
            ("bias", self.bias.validate()),
            ("revision", self.revision.validate()),
        ];
        sections
            .into_iter()
            .flat_map(|(name, issues)| issues.into_iter().map(move |i| format!("[{}] {}", name, i)))
            .collect()
    }

    // ==================== Use Case Input Factories ====================

    pub fn to_revise_input(
        &self,
        question: impl Into<Question>,
        answer: Answer,
        reasoning: impl Into<String>,
    ) -> ReviseAnswerInput {
        ReviseAnswerInput::new(question, answer)
            .with_reasoning(reasoning)
            .with_policy(self.revision.clone())
            .with_generation(self.generation.clone())
    }
}
