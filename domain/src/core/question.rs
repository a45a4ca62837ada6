//! Question value object

use serde::{Deserialize, Serialize};

/// The user question an answer was generated for (Value Object)
///
/// Carried into the revision prompt so the generation collaborator can
/// re-answer the same question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a new question
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Question cannot be empty");
        Self { content }
    }

    /// Try to create a new question, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let q = Question::new("What does Romans 5 teach about grace?");
        assert_eq!(q.content(), "What does Romans 5 teach about grace?");
    }

    #[test]
    fn test_try_new_rejects_blank() {
        assert!(Question::try_new("   ").is_none());
        assert!(Question::try_new("Who wrote Hebrews?").is_some());
    }

    #[test]
    #[should_panic(expected = "Question cannot be empty")]
    fn test_new_panics_on_blank() {
        Question::new("");
    }

    #[test]
    fn test_serde_is_transparent() {
        let q: Question = serde_json::from_str("\"Is faith a gift?\"").unwrap();
        assert_eq!(q.content(), "Is faith a gift?");
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"Is faith a gift?\"");
    }
}
