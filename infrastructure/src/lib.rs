//! Infrastructure layer for answer-critique
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod generation;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileFallacyConfig, FileGenerationConfig,
    FileLoggingConfig, FileOutputConfig, GenerationProvider,
};
pub use generation::{CommandGenerationGateway, gateway_from_config};
#[cfg(feature = "http-generation")]
pub use generation::HttpGenerationGateway;
pub use logging::JsonlCritiqueEventLogger;
