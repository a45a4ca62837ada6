//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid revision transition: {from} cannot handle {event}")]
    InvalidTransition { from: String, event: String },
}

/// Errors raised while building a detector.
///
/// Detectors themselves never fail on input text; the only failure point is
/// compiling a rule table (e.g. a custom pattern supplied through config).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("Invalid pattern for rule '{rule}': {message}")]
    InvalidPattern { rule: String, message: String },

    #[error("Unknown fallacy type: {0}")]
    UnknownFallacyType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let error = DomainError::InvalidTransition {
            from: "accepted".to_string(),
            event: "begin_revision".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid revision transition: accepted cannot handle begin_revision"
        );
    }
}
