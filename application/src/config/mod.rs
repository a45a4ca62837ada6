//! Application-level configuration.
//!
//! - [`GenerationParams`]: per-call controls for the generation collaborator
//! - [`EngineConfig`]: container for every setting the use cases read

pub mod engine_config;
pub mod generation_params;

pub use engine_config::EngineConfig;
pub use generation_params::{DEFAULT_GENERATION_TIMEOUT, GenerationParams};
