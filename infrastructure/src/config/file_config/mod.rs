//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Detector and revision sections deserialize straight into the domain
//! config types; every section is optional.

mod fallacy;
mod generation;
mod logging;
mod output;

pub use fallacy::FileFallacyConfig;
pub use generation::{FileGenerationConfig, GenerationProvider};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use critique_application::{EngineConfig, GenerationParams};
use critique_domain::{BiasConfig, CitationConfig, RevisionPolicy, ScoringConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems found by [`FileConfig::validate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("[generation] timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("[generation] provider \"command\" requires `command`")]
    MissingCommand,

    #[error("[generation] provider \"http\" requires `endpoint`")]
    MissingEndpoint,

    #[error("[fallacy] {0}")]
    InvalidRule(String),

    #[error("{0}")]
    InvalidSection(String),
}

impl ConfigValidationError {
    /// Rejected custom rules only degrade the fallacy detector, so the
    /// run can continue.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::InvalidRule(_))
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Penalty weights
    pub scoring: ScoringConfig,
    /// Citation proximity window and support ratio
    pub citation: CitationConfig,
    /// Stance-marker thresholds
    pub bias: BiasConfig,
    /// Threshold, attempt limit and prompt budget
    pub revision: RevisionPolicy,
    /// Extra fallacy rules
    pub fallacy: FileFallacyConfig,
    /// Generation collaborator
    pub generation: FileGenerationConfig,
    /// Diagnostic and event logs
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues: Vec<ConfigValidationError> = self
            .to_engine_config()
            .validate()
            .into_iter()
            .map(ConfigValidationError::InvalidSection)
            .collect();

        issues.extend(
            self.fallacy
                .rule_errors()
                .into_iter()
                .map(ConfigValidationError::InvalidRule),
        );

        if self.generation.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        match self.generation.provider {
            GenerationProvider::Command
                if self.generation.command.as_deref().is_none_or(|c| c.trim().is_empty()) =>
            {
                issues.push(ConfigValidationError::MissingCommand)
            }
            GenerationProvider::Http
                if self.generation.endpoint.as_deref().is_none_or(|e| e.trim().is_empty()) =>
            {
                issues.push(ConfigValidationError::MissingEndpoint)
            }
            _ => {}
        }

        issues
    }

    /// Application config built from the file sections.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            self.scoring.clone(),
            self.citation.clone(),
            self.bias.clone(),
            self.revision.clone(),
        )
        .with_custom_rules(self.fallacy.custom_rules.clone())
        .with_generation(GenerationParams::from_timeout_seconds(
            self.generation.timeout_seconds,
        ))
    }
}
