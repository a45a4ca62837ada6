//! Critique Answer use case
//!
//! Runs the three detectors concurrently over one answer and folds their
//! findings into a scored [`Critique`].

use crate::config::EngineConfig;
use crate::metrics::CritiqueMetrics;
use crate::ports::critique_events::{
    self, CritiqueEvent, CritiqueEventLogger, NoCritiqueEvents,
};
use critique_domain::{
    Answer, BiasDetector, BiasWarning, CitationAnalysis, CitationAnalyzer, Critique, DetectorKind,
    FallacyDetector, FallacyWarning, QualityScorer,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Use case for critiquing a single answer
///
/// Detectors are shared behind `Arc`s and run on the blocking pool; a
/// detector that panics is reported as degraded and contributes nothing.
pub struct CritiqueAnswerUseCase {
    fallacy: Arc<FallacyDetector>,
    citation: Arc<CitationAnalyzer>,
    bias: Arc<BiasDetector>,
    scorer: QualityScorer,
    /// Detectors degraded at construction (e.g. rejected custom rules)
    degraded_at_build: Vec<DetectorKind>,
    events: Arc<dyn CritiqueEventLogger>,
    metrics: Arc<CritiqueMetrics>,
}

impl CritiqueAnswerUseCase {
    /// Build the detectors from configuration.
    ///
    /// Custom fallacy rules that fail to compile are dropped; the built-in
    /// table is used instead and the fallacy detector is reported degraded.
    pub fn new(config: &EngineConfig) -> Self {
        let mut degraded_at_build = Vec::new();
        let fallacy = match FallacyDetector::with_custom_rules(config.custom_rules()) {
            Ok(detector) => detector,
            Err(e) => {
                warn!("Custom fallacy rules rejected, using built-in rules: {}", e);
                degraded_at_build.push(DetectorKind::Fallacy);
                FallacyDetector::new().unwrap_or_else(|e| {
                    warn!("Built-in fallacy rules failed to compile: {}", e);
                    FallacyDetector::with_rules(Vec::new())
                })
            }
        };

        Self {
            fallacy: Arc::new(fallacy),
            citation: Arc::new(CitationAnalyzer::new(config.citation().clone())),
            bias: Arc::new(BiasDetector::new(config.bias().clone())),
            scorer: QualityScorer::new(config.scoring().clone()),
            degraded_at_build,
            events: Arc::new(NoCritiqueEvents),
            metrics: Arc::new(CritiqueMetrics::new()),
        }
    }

    pub fn with_event_logger(mut self, events: Arc<dyn CritiqueEventLogger>) -> Self {
        self.events = events;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<CritiqueMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<CritiqueMetrics> {
        &self.metrics
    }

    pub(crate) fn events(&self) -> &dyn CritiqueEventLogger {
        self.events.as_ref()
    }

    /// Critique `answer`; `reasoning` only feeds the bias detector.
    pub async fn execute(&self, answer: &Answer, reasoning: &str) -> Critique {
        let text: Arc<str> = Arc::from(answer.summary.as_str());
        let reasoning: Arc<str> = Arc::from(reasoning);
        let citations = Arc::new(answer.citations.clone());

        let fallacy_task = {
            let detector = Arc::clone(&self.fallacy);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || detector.detect(&text))
        };
        let citation_task = {
            let analyzer = Arc::clone(&self.citation);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || analyzer.analyze_with_issues(&text, &citations))
        };
        let bias_task = {
            let detector = Arc::clone(&self.bias);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || detector.detect(&text, &reasoning))
        };

        let (fallacies, citation, bias) = tokio::join!(fallacy_task, citation_task, bias_task);
        self.assemble(answer, fallacies, citation, bias)
    }

    /// Fold joined detector results into a critique. A failed task counts as
    /// a degraded detector with no findings.
    fn assemble(
        &self,
        answer: &Answer,
        fallacies: Result<Vec<FallacyWarning>, JoinError>,
        citation: Result<CitationAnalysis, JoinError>,
        bias: Result<Vec<BiasWarning>, JoinError>,
    ) -> Critique {
        let mut degraded = self.degraded_at_build.clone();
        let fallacies = self.or_degraded(DetectorKind::Fallacy, fallacies, &mut degraded);
        let citation = self.or_degraded(DetectorKind::Citation, citation, &mut degraded);
        let bias_warnings = self.or_degraded(DetectorKind::Bias, bias, &mut degraded);

        for issue in &citation.issues {
            warn!("Malformed citation [{}]: {}", issue.index, issue.kind.as_str());
            self.events.log(CritiqueEvent::new(
                critique_events::MALFORMED_CITATION,
                json!({
                    "index": issue.index,
                    "issue": issue.kind.as_str(),
                    "excluded": issue.kind.excludes_from_analysis(),
                }),
            ));
        }
        let dangling = answer.dangling_indices();
        if !dangling.is_empty() {
            debug!("Markers without citations: {:?}", dangling);
        }

        for warning in &fallacies {
            debug!(
                "Fallacy {} ({}) x{}: {}",
                warning.fallacy_type, warning.severity, warning.occurrence_count, warning.matched_span
            );
            self.events.log(CritiqueEvent::new(
                critique_events::FALLACY_DETECTED,
                json!({
                    "fallacy_type": warning.fallacy_type.as_str(),
                    "severity": warning.severity.as_str(),
                    "matched_span": warning.matched_span,
                    "occurrences": warning.occurrence_count,
                }),
            ));
        }
        for weak in &citation.weak {
            debug!(
                "Weak citation [{}] {}: {} (support {:.2})",
                weak.index,
                weak.reference,
                weak.reason.as_str(),
                weak.support_ratio
            );
            self.events.log(CritiqueEvent::new(
                critique_events::WEAK_CITATION,
                json!({
                    "index": weak.index,
                    "reference": weak.reference,
                    "reason": weak.reason.as_str(),
                    "support_ratio": weak.support_ratio,
                }),
            ));
        }
        for warning in &bias_warnings {
            debug!(
                "Bias {} (strength {:.2}): {:?}",
                warning.direction, warning.strength, warning.triggering_terms
            );
            self.events.log(CritiqueEvent::new(
                critique_events::BIAS_WARNING,
                json!({
                    "direction": warning.direction.as_str(),
                    "strength": warning.strength,
                    "terms": warning.triggering_terms,
                }),
            ));
        }

        let base_score = i64::from(self.scorer.config().base_score);
        let breakdown =
            self.scorer
                .breakdown(base_score, &fallacies, &citation.weak, &bias_warnings);
        let score = QualityScorer::score_from(&breakdown);

        info!(
            "Quality score {} (fallacies {}, weak citations {}, bias warnings {})",
            score,
            fallacies.len(),
            citation.weak.len(),
            bias_warnings.len()
        );
        self.events.log(CritiqueEvent::new(
            critique_events::SCORE_COMPUTED,
            json!({
                "quality_score": score,
                "breakdown": breakdown,
                "degraded": degraded.iter().map(DetectorKind::as_str).collect::<Vec<_>>(),
            }),
        ));
        self.metrics.record_evaluation(
            fallacies.len(),
            citation.weak.len(),
            bias_warnings.len(),
            citation.issues.len(),
        );

        Critique::new(score, fallacies, citation.weak, bias_warnings, breakdown)
            .with_degraded(degraded)
    }

    fn or_degraded<T: Default>(
        &self,
        kind: DetectorKind,
        result: Result<T, JoinError>,
        degraded: &mut Vec<DetectorKind>,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("{} detector failed, treating as no findings: {}", kind.as_str(), e);
                self.events.log(CritiqueEvent::new(
                    critique_events::DETECTOR_DEGRADED,
                    json!({ "detector": kind.as_str(), "error": e.to_string() }),
                ));
                self.metrics.record_degradation();
                if !degraded.contains(&kind) {
                    degraded.push(kind);
                }
                T::default()
            }
        }
    }
}
