//! Logging infrastructure: structured critique event logging.
//!
//! Provides [`JsonlCritiqueEventLogger`], a JSONL file writer that implements
//! the [`CritiqueEventLogger`](critique_application::CritiqueEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlCritiqueEventLogger;
