//! Revise Answer use case
//!
//! Drives the revision state machine: critique the answer, and while it
//! scores below the threshold and attempts remain, ask the generation
//! collaborator for a revision and critique the result.
//!
//! ```text
//! Drafted ──critique──▶ Critiqued ──decide──▶ Accepted
//!    ▲                                  │
//!    │                                  ▼
//!    └──generated── Revising ◀── NeedsRevision
//!                      │
//!                      └──failed / cancelled──▶ Exhausted
//! ```
//!
//! The use case never fails: generation errors, timeouts and cancellation
//! end the loop with the best answer seen so far.

use super::critique_answer::CritiqueAnswerUseCase;
use crate::config::GenerationParams;
use crate::ports::critique_events::{self, CritiqueEvent};
use crate::ports::generation::{GenerationError, GenerationGateway};
use critique_domain::{
    AcceptReason, Answer, AttemptOutcome, Critique, PendingAttempt, Question, RevisionAttempt,
    RevisionEvent, RevisionOutcome, RevisionPolicy, RevisionPromptBuilder, RevisionState,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Input for the ReviseAnswer use case
#[derive(Debug, Clone)]
pub struct ReviseAnswerInput {
    pub question: Question,
    pub answer: Answer,
    /// Model reasoning behind the answer; only read by the bias detector
    pub reasoning: String,
    pub policy: RevisionPolicy,
    pub generation: GenerationParams,
}

impl ReviseAnswerInput {
    pub fn new(question: impl Into<Question>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            answer,
            reasoning: String::new(),
            policy: RevisionPolicy::default(),
            generation: GenerationParams::default(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_policy(mut self, policy: RevisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }
}

/// Best answer seen so far with its critique.
struct Best {
    answer: Answer,
    critique: Critique,
}

/// Use case for critiquing and revising an answer
pub struct ReviseAnswerUseCase<G: GenerationGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    critic: Arc<CritiqueAnswerUseCase>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: GenerationGateway + ?Sized + 'static> ReviseAnswerUseCase<G> {
    pub fn new(gateway: Arc<G>, critic: Arc<CritiqueAnswerUseCase>) -> Self {
        Self {
            gateway,
            critic,
            cancellation_token: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    pub async fn execute(&self, input: ReviseAnswerInput) -> RevisionOutcome {
        let policy = &input.policy;
        let prompts = RevisionPromptBuilder::new(policy.token_budget);

        info!(
            "Evaluating answer ({} citations, threshold {}, max {} attempts)",
            input.answer.citations.len(),
            policy.quality_threshold,
            policy.max_attempts
        );

        let mut state = RevisionState::Drafted;
        let mut current = input.answer.clone();
        let mut current_critique: Option<Critique> = None;
        let mut best: Option<Best> = None;
        let mut initial_score = None;
        let mut pending: Option<PendingAttempt> = None;
        let mut attempts: Vec<RevisionAttempt> = Vec::new();

        while !state.is_terminal() {
            let event = match state {
                RevisionState::Drafted => {
                    let critique = self
                        .critic
                        .execute(&current, &input.reasoning)
                        .await
                        .with_revised(pending.is_some());
                    let score = critique.quality_score();
                    initial_score.get_or_insert(score);

                    let best_score = best.as_ref().map(|b| b.critique.quality_score());
                    if let Some(attempt) = pending.take() {
                        let attempt = attempt.generated(
                            current.clone(),
                            critique.clone(),
                            best_score.unwrap_or(0),
                        );
                        self.record_attempt(&attempt);
                        attempts.push(attempt);
                    }
                    // Strictly greater: the earliest answer wins ties
                    if best_score.is_none_or(|b| score > b) {
                        best = Some(Best {
                            answer: current.clone(),
                            critique: critique.clone(),
                        });
                    }
                    current_critique = Some(critique);
                    RevisionEvent::Critiqued {
                        quality_score: score,
                    }
                }
                RevisionState::Critiqued { .. } => RevisionEvent::Evaluate,
                RevisionState::NeedsRevision => {
                    if self.is_cancelled() {
                        RevisionEvent::Cancelled
                    } else {
                        RevisionEvent::BeginRevision
                    }
                }
                RevisionState::Revising => {
                    let Some(critique) = current_critique.as_ref() else {
                        warn!("Revising without a critique; stopping");
                        break;
                    };
                    let attempt = PendingAttempt::start(attempts.len() + 1, current.clone());
                    let prompt = prompts.build(&input.question, &current, critique);
                    if prompt.over_budget {
                        warn!(
                            "Revision prompt is ~{} tokens, over the budget of {}",
                            prompt.estimated_tokens, policy.token_budget
                        );
                    } else if prompt.truncated() {
                        debug!("Revision prompt truncated to ~{} tokens", prompt.estimated_tokens);
                    }

                    info!(
                        "Revision attempt {}/{} via {}",
                        attempt.attempt_number(),
                        policy.max_attempts,
                        self.gateway.name()
                    );
                    match self.generate(&prompt.text, &input.generation).await {
                        Ok(text) => {
                            current = current.with_revised_summary(text);
                            let dangling = current.dangling_indices();
                            if !dangling.is_empty() {
                                warn!("Revision introduced unknown citation markers: {:?}", dangling);
                            }
                            pending = Some(attempt);
                            RevisionEvent::Generated
                        }
                        Err(e) => {
                            warn!("Revision attempt {} failed: {}", attempt.attempt_number(), e);
                            let attempt = attempt.failed(e.to_string());
                            // An interrupted call is a cancellation, not a backend failure
                            let event = if e.is_cancelled() {
                                self.log_attempt(&attempt);
                                RevisionEvent::Cancelled
                            } else {
                                self.record_attempt(&attempt);
                                RevisionEvent::GenerationFailed
                            };
                            attempts.push(attempt);
                            event
                        }
                    }
                }
                RevisionState::Accepted { .. } | RevisionState::Exhausted { .. } => break,
            };

            let remaining = policy.max_attempts.saturating_sub(attempts.len());
            state = match state.transition(event, remaining, policy) {
                Ok(next) => next,
                Err(e) => {
                    warn!("{}; returning best answer", e);
                    RevisionState::Accepted {
                        reason: AcceptReason::AttemptsExhausted,
                    }
                }
            };
            debug!("Revision state: {}", state);
        }

        // The first Drafted round always records a best answer
        let Best { answer, critique } = match best {
            Some(best) => best,
            None => {
                let critique = self.critic.execute(&input.answer, &input.reasoning).await;
                Best {
                    answer: input.answer.clone(),
                    critique,
                }
            }
        };
        let initial_score = initial_score.unwrap_or(critique.quality_score());

        if let RevisionState::Exhausted { reason } = state {
            info!("Revision stopped ({:?}); returning best answer", reason);
            if reason == critique_domain::ExhaustReason::Cancelled {
                self.critic.metrics().record_cancellation();
            }
        }
        info!(
            "Final quality score {} (initial {}, {} attempts, revised: {})",
            critique.quality_score(),
            initial_score,
            attempts.len(),
            critique.revised()
        );
        self.critic.events().log(CritiqueEvent::new(
            critique_events::REVISION_FINISHED,
            json!({
                "final_state": state,
                "initial_score": initial_score,
                "final_score": critique.quality_score(),
                "attempts": attempts.len(),
                "revised": critique.revised(),
            }),
        ));

        RevisionOutcome {
            answer,
            critique,
            initial_score,
            attempts,
            final_state: state,
        }
    }

    /// One generation call under the timeout, racing the cancellation token.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
        let timeout = params.timeout;
        let call = async {
            let request = self.gateway.generate(RevisionPromptBuilder::system(), prompt);
            tokio::time::timeout(timeout, request)
                .await
                .unwrap_or(Err(GenerationError::Timeout(timeout.as_secs())))
        };

        let text = if let Some(ref token) = self.cancellation_token {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(GenerationError::Cancelled),
                result = call => result,
            }
        } else {
            call.await
        }?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn record_attempt(&self, attempt: &RevisionAttempt) {
        match &attempt.outcome {
            AttemptOutcome::GenerationFailed { .. } => {
                self.critic.metrics().record_generation_failure()
            }
            outcome => self
                .critic
                .metrics()
                .record_attempt(*outcome == AttemptOutcome::Improved),
        }
        self.log_attempt(attempt);
    }

    fn log_attempt(&self, attempt: &RevisionAttempt) {
        self.critic.events().log(CritiqueEvent::new(
            critique_events::REVISION_ATTEMPT,
            json!({
                "attempt": attempt.attempt_number,
                "outcome": attempt.outcome.as_str(),
                "score": attempt.score(),
                "error": match &attempt.outcome {
                    AttemptOutcome::GenerationFailed { error } => Some(error.as_str()),
                    _ => None,
                },
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ports::critique_events::testing::RecordingEvents;
    use async_trait::async_trait;
    use critique_domain::{Citation, ExhaustReason};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    const BAD: &str =
        "Only fools would doubt that Paul wrote this letter [1]. Critics are simply ignorant.";
    const MIDDLING: &str = "Paul wrote this letter [1].";
    const GOOD: &str = "Paul calls himself a servant of Jesus Christ, called to be an apostle and separated unto the gospel of God [1].";

    /// A scripted generation result
    #[derive(Debug, Clone)]
    enum Scripted {
        Text(String),
        Error(GenerationError),
        /// Never returns
        Hang,
    }

    /// Mock gateway that returns scripted results in order
    struct ScriptedGateway {
        responses: Mutex<VecDeque<Scripted>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Scripted>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, n: usize) -> String {
            self.prompts.lock().unwrap()[n].clone()
        }
    }

    #[async_trait]
    impl GenerationGateway for ScriptedGateway {
        async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Error(GenerationError::Other("no more responses".into())));
            match next {
                Scripted::Text(t) => Ok(t),
                Scripted::Error(e) => Err(e),
                Scripted::Hang => std::future::pending().await,
            }
        }
    }

    fn answer(text: &str) -> Answer {
        Answer::new(
            text,
            vec![
                Citation::new(
                    1,
                    "Paul, a servant of Jesus Christ, called to be an apostle, separated unto the gospel of God.",
                )
                .with_osis("Rom.1.1"),
                Citation::new(2, "Unused source about Corinth.").with_osis("1Cor.1.2"),
            ],
        )
    }

    fn input(text: &str, policy: RevisionPolicy) -> ReviseAnswerInput {
        ReviseAnswerInput::new("Who wrote Romans?", answer(text)).with_policy(policy)
    }

    fn use_case(
        gateway: Arc<ScriptedGateway>,
    ) -> (ReviseAnswerUseCase<ScriptedGateway>, Arc<RecordingEvents>) {
        let events = Arc::new(RecordingEvents::default());
        let critic = CritiqueAnswerUseCase::new(&EngineConfig::default())
            .with_event_logger(events.clone());
        (ReviseAnswerUseCase::new(gateway, Arc::new(critic)), events)
    }

    fn strict() -> RevisionPolicy {
        RevisionPolicy::default().with_quality_threshold(95)
    }

    #[tokio::test]
    async fn test_good_answer_accepted_without_generation() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case.execute(input(GOOD, strict())).await;

        assert_eq!(gateway.calls(), 0);
        // The unreferenced second citation costs 5
        assert_eq!(outcome.final_score(), 95);
        assert_eq!(outcome.initial_score, 95);
        assert!(!outcome.revised());
        assert!(outcome.attempts.is_empty());
        assert_eq!(
            outcome.final_state,
            RevisionState::Accepted {
                reason: AcceptReason::MetThreshold
            }
        );
    }

    #[tokio::test]
    async fn test_revision_improves_and_preserves_citations() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Text(GOOD.to_string())]));
        let (use_case, events) = use_case(gateway.clone());

        let outcome = use_case.execute(input(BAD, strict())).await;

        assert_eq!(gateway.calls(), 1);
        assert_eq!(outcome.initial_score, 75);
        assert_eq!(outcome.final_score(), 95);
        assert!(outcome.revised());
        assert_eq!(outcome.answer.summary, GOOD);
        assert_eq!(outcome.answer.citations, answer(BAD).citations);
        assert_eq!(outcome.attempts.len(), 1);
        assert!(outcome.attempts[0].improved());
        assert_eq!(outcome.attempts[0].input.summary, BAD);
        assert_eq!(
            outcome.final_state,
            RevisionState::Accepted {
                reason: AcceptReason::MetThreshold
            }
        );
        assert_eq!(events.of_type(critique_events::REVISION_ATTEMPT).len(), 1);
        assert_eq!(events.of_type(critique_events::REVISION_FINISHED).len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_question_and_only_referenced_citations() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Text(GOOD.to_string())]));
        let (use_case, _) = use_case(gateway.clone());

        use_case.execute(input(BAD, strict())).await;

        let prompt = gateway.prompt(0);
        assert!(prompt.contains("Who wrote Romans?"));
        assert!(prompt.contains(BAD));
        assert!(prompt.contains("Rom.1.1"));
        assert!(!prompt.contains("1Cor.1.2"));
        assert!(prompt.contains("do not renumber"));
    }

    #[tokio::test]
    async fn test_terminates_within_max_attempts() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Scripted::Text(BAD.to_string()),
            Scripted::Text(BAD.to_string()),
            Scripted::Text(GOOD.to_string()),
        ]));
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case
            .execute(input(BAD, strict().with_max_attempts(2)))
            .await;

        assert_eq!(gateway.calls(), 2);
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts.iter().all(|a| !a.improved()));
        assert_eq!(
            outcome.final_state,
            RevisionState::Accepted {
                reason: AcceptReason::AttemptsExhausted
            }
        );
        // Ties keep the earliest answer, which is the original
        assert!(!outcome.revised());
        assert_eq!(outcome.final_score(), 75);
    }

    #[tokio::test]
    async fn test_best_answer_returned_not_last() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Scripted::Text(MIDDLING.to_string()),
            Scripted::Text(BAD.to_string()),
        ]));
        let (use_case, _) = use_case(gateway.clone());
        let policy = RevisionPolicy::default()
            .with_quality_threshold(100)
            .with_max_attempts(2);

        let outcome = use_case.execute(input(BAD, policy)).await;

        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Improved);
        assert_eq!(outcome.attempts[1].outcome, AttemptOutcome::NoImprovement);
        assert_eq!(outcome.answer.summary, MIDDLING);
        assert_eq!(outcome.final_score(), 90);
        assert!(outcome.revised());
    }

    #[tokio::test]
    async fn test_generation_failure_returns_original() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Error(
            GenerationError::Connection("refused".to_string()),
        )]));
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case.execute(input(BAD, strict())).await;

        assert_eq!(outcome.answer.summary, BAD);
        assert_eq!(outcome.final_score(), 75);
        assert!(!outcome.revised());
        assert_eq!(
            outcome.final_state,
            RevisionState::Exhausted {
                reason: ExhaustReason::GenerationFailed
            }
        );
        assert_eq!(outcome.attempts.len(), 1);
        assert!(matches!(
            &outcome.attempts[0].outcome,
            AttemptOutcome::GenerationFailed { error } if error.contains("refused")
        ));
        assert_eq!(use_case.critic.metrics().snapshot().generation_failures, 1);
    }

    #[tokio::test]
    async fn test_empty_generation_is_a_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Text("   ".to_string())]));
        let (use_case, _) = use_case(gateway);

        let outcome = use_case.execute(input(BAD, strict())).await;

        assert_eq!(
            outcome.final_state,
            RevisionState::Exhausted {
                reason: ExhaustReason::GenerationFailed
            }
        );
        assert_eq!(outcome.answer.summary, BAD);
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Hang]));
        let (use_case, _) = use_case(gateway);
        let input = input(BAD, strict()).with_generation(
            GenerationParams::default().with_timeout(Duration::from_millis(50)),
        );

        let outcome = use_case.execute(input).await;

        assert_eq!(
            outcome.final_state,
            RevisionState::Exhausted {
                reason: ExhaustReason::GenerationFailed
            }
        );
        assert!(matches!(
            &outcome.attempts[0].outcome,
            AttemptOutcome::GenerationFailed { error } if error.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_revision() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Text(GOOD.to_string())]));
        let (use_case, _) = use_case(gateway.clone());
        let token = CancellationToken::new();
        token.cancel();
        let use_case = use_case.with_cancellation(token);

        let outcome = use_case.execute(input(BAD, strict())).await;

        assert_eq!(gateway.calls(), 0);
        assert!(outcome.attempts.is_empty());
        assert_eq!(outcome.answer.summary, BAD);
        assert_eq!(
            outcome.final_state,
            RevisionState::Exhausted {
                reason: ExhaustReason::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_during_generation() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Hang]));
        let (use_case, _) = use_case(gateway);
        let token = CancellationToken::new();
        let use_case = use_case.with_cancellation(token.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let outcome = use_case.execute(input(BAD, strict())).await;

        assert_eq!(
            outcome.final_state,
            RevisionState::Exhausted {
                reason: ExhaustReason::Cancelled
            }
        );
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.answer.summary, BAD);
        let snapshot = use_case.critic.metrics().snapshot();
        assert_eq!(snapshot.cancellations, 1);
        assert_eq!(snapshot.generation_failures, 0);
    }

    #[tokio::test]
    async fn test_critique_only_policy_never_generates() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Text(GOOD.to_string())]));
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case
            .execute(input(BAD, RevisionPolicy::critique_only()))
            .await;

        assert_eq!(gateway.calls(), 0);
        assert_eq!(
            outcome.final_state,
            RevisionState::Accepted {
                reason: AcceptReason::AttemptsExhausted
            }
        );
    }
}
