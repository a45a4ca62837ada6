//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`]: the user question an answer responds to
//! - [`error::DomainError`]: domain-level errors
//! - [`error::DetectorError`]: rule table construction errors
//! - [`string`]: UTF-8 safe truncation helpers

pub mod error;
pub mod question;
pub mod string;
