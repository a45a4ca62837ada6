//! Prompt domain
//!
//! Builds the text handed to the generation collaborator.

mod revision;

pub use revision::{CHARS_PER_TOKEN, RevisionPrompt, RevisionPromptBuilder, estimate_tokens};
