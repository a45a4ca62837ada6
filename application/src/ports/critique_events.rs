//! Port for structured critique event logging.
//!
//! Defines the [`CritiqueEventLogger`] trait for recording every finding and
//! decision of an evaluation (fallacies, weak citations, scores, revision
//! attempts) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! audit trail (JSONL).

use serde_json::Value;
use std::sync::Arc;

pub const FALLACY_DETECTED: &str = "fallacy_detected";
pub const WEAK_CITATION: &str = "weak_citation";
pub const BIAS_WARNING: &str = "bias_warning";
pub const MALFORMED_CITATION: &str = "malformed_citation";
pub const DETECTOR_DEGRADED: &str = "detector_degraded";
pub const SCORE_COMPUTED: &str = "score_computed";
pub const REVISION_ATTEMPT: &str = "revision_attempt";
pub const REVISION_FINISHED: &str = "revision_finished";

/// A structured critique event.
///
/// Each event has a type string and a JSON payload with event-specific
/// fields. Adapters add the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CritiqueEvent {
    /// Event type identifier (e.g. "fallacy_detected", "score_computed").
    pub event_type: &'static str,
    pub payload: Value,
}

impl CritiqueEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging critique events.
///
/// `log` is synchronous and infallible; a failing sink must not disturb
/// the evaluation.
pub trait CritiqueEventLogger: Send + Sync {
    fn log(&self, event: CritiqueEvent);
}

/// No-op implementation for tests and when event logging is disabled.
pub struct NoCritiqueEvents;

impl CritiqueEventLogger for NoCritiqueEvents {
    fn log(&self, _event: CritiqueEvent) {}
}

/// Forwards every event to each wrapped logger in order.
#[derive(Default)]
pub struct FanoutCritiqueEvents {
    loggers: Vec<Arc<dyn CritiqueEventLogger>>,
}

impl FanoutCritiqueEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logger: Arc<dyn CritiqueEventLogger>) -> Self {
        self.loggers.push(logger);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl CritiqueEventLogger for FanoutCritiqueEvents {
    fn log(&self, event: CritiqueEvent) {
        if let Some((last, rest)) = self.loggers.split_last() {
            for logger in rest {
                logger.log(event.clone());
            }
            last.log(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Collects events in memory.
    #[derive(Default)]
    pub struct RecordingEvents {
        events: Mutex<Vec<CritiqueEvent>>,
    }

    impl RecordingEvents {
        pub fn events(&self) -> Vec<CritiqueEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn of_type(&self, event_type: &str) -> Vec<CritiqueEvent> {
            self.events()
                .into_iter()
                .filter(|e| e.event_type == event_type)
                .collect()
        }
    }

    impl CritiqueEventLogger for RecordingEvents {
        fn log(&self, event: CritiqueEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
