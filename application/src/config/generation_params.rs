//! Generation parameters: how the orchestrator calls the collaborator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default limit on a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-call controls for the generation collaborator.
///
/// These are application-layer concerns, not domain policy: the domain
/// decides *whether* to revise, these decide how long a call may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Limit for each generation call; every call is bounded.
    pub timeout: Duration,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

impl GenerationParams {
    pub fn from_timeout_seconds(seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(GenerationParams::default().timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_timeout_seconds() {
        assert_eq!(
            GenerationParams::from_timeout_seconds(5).timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_with_timeout() {
        let params = GenerationParams::default().with_timeout(Duration::from_millis(250));
        assert_eq!(params.timeout, Duration::from_millis(250));
    }
}
