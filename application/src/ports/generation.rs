//! Generation gateway port
//!
//! Defines the interface for the external collaborator that produces revised
//! answer text from a revision prompt.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while generating a revision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Generation returned an empty response")]
    EmptyResponse,

    #[error("Generation is not configured")]
    NotConfigured,

    #[error("Other error: {0}")]
    Other(String),
}

impl GenerationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }
}

/// Gateway for answer generation
///
/// Implementations (adapters) live in the infrastructure layer. The
/// orchestrator owns timeouts and cancellation; adapters only need to
/// return the generated text or an error.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produce revised answer text for `prompt`.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Short name for logs
    fn name(&self) -> &str {
        "generation"
    }
}

/// Gateway used when no generation collaborator is configured.
///
/// Every call fails, so a low-scoring answer ends the loop with the
/// original answer and a `GenerationFailed` outcome.
pub struct NoGeneration;

#[async_trait]
impl GenerationGateway for NoGeneration {
    async fn generate(&self, _system_prompt: &str, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }

    fn name(&self) -> &str {
        "none"
    }
}
