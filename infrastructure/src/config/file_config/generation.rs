//! Generation configuration from TOML (`[generation]` section)

use serde::{Deserialize, Serialize};

/// Which generation adapter revises answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// No collaborator; low-scoring answers are returned unrevised
    #[default]
    None,
    /// Run a local command, prompt on stdin, answer on stdout
    Command,
    /// OpenAI-compatible chat-completions endpoint
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub provider: GenerationProvider,
    /// Shell command for the `command` provider
    pub command: Option<String>,
    /// Chat-completions URL for the `http` provider
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Environment variable holding the API key (default: "CRITIQUE_API_KEY").
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Limit per generation call; 0 is rejected by validation
    pub timeout_seconds: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::None,
            command: None,
            endpoint: None,
            model: None,
            api_key_env: "CRITIQUE_API_KEY".to_string(),
            max_tokens: 2048,
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

impl FileGenerationConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
