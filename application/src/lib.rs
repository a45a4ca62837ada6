//! Application layer for answer-critique
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod metrics;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, GenerationParams};
pub use metrics::{CritiqueMetrics, MetricsSnapshot};
pub use ports::{
    critique_events::{
        CritiqueEvent, CritiqueEventLogger, FanoutCritiqueEvents, NoCritiqueEvents,
    },
    generation::{GenerationError, GenerationGateway, NoGeneration},
};
pub use use_cases::critique_answer::CritiqueAnswerUseCase;
pub use use_cases::revise_answer::{ReviseAnswerInput, ReviseAnswerUseCase};
