//! Revision state machine.
//!
//! ```text
//! Drafted -> Critiqued -> { Accepted | NeedsRevision }
//! NeedsRevision -> Revising -> { Drafted | Exhausted }
//! ```
//!
//! Every transition is a pure function of the current state, the event, the
//! number of attempts remaining and the policy. The orchestrator drives it in
//! an explicit loop.

use super::policy::RevisionPolicy;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Why the loop stopped with an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptReason {
    /// The current answer scored at or above the threshold
    MetThreshold,
    /// No attempts left; the best answer seen is returned
    AttemptsExhausted,
}

/// Why the loop stopped without finishing a revision round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustReason {
    /// The generation collaborator failed or timed out
    GenerationFailed,
    /// The caller cancelled the evaluation
    Cancelled,
}

impl AcceptReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptReason::MetThreshold => "met threshold",
            AcceptReason::AttemptsExhausted => "attempts exhausted",
        }
    }
}

impl ExhaustReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExhaustReason::GenerationFailed => "generation failed",
            ExhaustReason::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RevisionState {
    Drafted,
    Critiqued { quality_score: u8 },
    NeedsRevision,
    Revising,
    Accepted { reason: AcceptReason },
    Exhausted { reason: ExhaustReason },
}

/// Inputs that move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionEvent {
    Critiqued { quality_score: u8 },
    Evaluate,
    BeginRevision,
    Generated,
    GenerationFailed,
    Cancelled,
}

impl RevisionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionEvent::Critiqued { .. } => "critiqued",
            RevisionEvent::Evaluate => "evaluate",
            RevisionEvent::BeginRevision => "begin_revision",
            RevisionEvent::Generated => "generated",
            RevisionEvent::GenerationFailed => "generation_failed",
            RevisionEvent::Cancelled => "cancelled",
        }
    }
}

impl RevisionState {
    /// Decide what follows a critique.
    pub fn decide(quality_score: u8, attempts_remaining: usize, policy: &RevisionPolicy) -> Self {
        if quality_score >= policy.quality_threshold {
            RevisionState::Accepted {
                reason: AcceptReason::MetThreshold,
            }
        } else if attempts_remaining == 0 {
            RevisionState::Accepted {
                reason: AcceptReason::AttemptsExhausted,
            }
        } else {
            RevisionState::NeedsRevision
        }
    }

    /// Apply an event, or reject it when the state cannot handle it.
    pub fn transition(
        self,
        event: RevisionEvent,
        attempts_remaining: usize,
        policy: &RevisionPolicy,
    ) -> Result<Self, DomainError> {
        use RevisionState::*;

        match (self, event) {
            (state, RevisionEvent::Cancelled) if !state.is_terminal() => Ok(Exhausted {
                reason: ExhaustReason::Cancelled,
            }),
            (Drafted, RevisionEvent::Critiqued { quality_score }) => {
                Ok(Critiqued { quality_score })
            }
            (Critiqued { quality_score }, RevisionEvent::Evaluate) => {
                Ok(Self::decide(quality_score, attempts_remaining, policy))
            }
            (NeedsRevision, RevisionEvent::BeginRevision) => Ok(Revising),
            (Revising, RevisionEvent::Generated) => Ok(Drafted),
            (Revising, RevisionEvent::GenerationFailed) => Ok(Exhausted {
                reason: ExhaustReason::GenerationFailed,
            }),
            (state, event) => Err(DomainError::InvalidTransition {
                from: state.as_str().to_string(),
                event: event.as_str().to_string(),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RevisionState::Accepted { .. } | RevisionState::Exhausted { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionState::Drafted => "drafted",
            RevisionState::Critiqued { .. } => "critiqued",
            RevisionState::NeedsRevision => "needs_revision",
            RevisionState::Revising => "revising",
            RevisionState::Accepted { .. } => "accepted",
            RevisionState::Exhausted { .. } => "exhausted",
        }
    }
}

impl std::fmt::Display for RevisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevisionState::Critiqued { quality_score } => write!(f, "critiqued ({})", quality_score),
            RevisionState::Accepted { reason } => write!(f, "accepted ({})", reason.as_str()),
            RevisionState::Exhausted { reason } => write!(f, "exhausted ({})", reason.as_str()),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RevisionPolicy {
        RevisionPolicy::default()
    }

    #[test]
    fn test_decide() {
        let p = policy();
        assert_eq!(
            RevisionState::decide(70, 2, &p),
            RevisionState::Accepted {
                reason: AcceptReason::MetThreshold
            }
        );
        assert_eq!(RevisionState::decide(69, 1, &p), RevisionState::NeedsRevision);
        assert_eq!(
            RevisionState::decide(10, 0, &p),
            RevisionState::Accepted {
                reason: AcceptReason::AttemptsExhausted
            }
        );
    }

    #[test]
    fn test_full_revision_round() {
        let p = policy();
        let state = RevisionState::Drafted
            .transition(RevisionEvent::Critiqued { quality_score: 40 }, 2, &p)
            .unwrap();
        assert_eq!(state, RevisionState::Critiqued { quality_score: 40 });

        let state = state.transition(RevisionEvent::Evaluate, 2, &p).unwrap();
        assert_eq!(state, RevisionState::NeedsRevision);

        let state = state.transition(RevisionEvent::BeginRevision, 2, &p).unwrap();
        assert_eq!(state, RevisionState::Revising);

        let state = state.transition(RevisionEvent::Generated, 1, &p).unwrap();
        assert_eq!(state, RevisionState::Drafted);

        let state = state
            .transition(RevisionEvent::Critiqued { quality_score: 90 }, 1, &p)
            .and_then(|s| s.transition(RevisionEvent::Evaluate, 1, &p))
            .unwrap();
        assert_eq!(
            state,
            RevisionState::Accepted {
                reason: AcceptReason::MetThreshold
            }
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn test_generation_failure_exhausts() {
        let state = RevisionState::Revising
            .transition(RevisionEvent::GenerationFailed, 1, &policy())
            .unwrap();
        assert_eq!(
            state,
            RevisionState::Exhausted {
                reason: ExhaustReason::GenerationFailed
            }
        );
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        for state in [
            RevisionState::Drafted,
            RevisionState::Critiqued { quality_score: 5 },
            RevisionState::NeedsRevision,
            RevisionState::Revising,
        ] {
            assert_eq!(
                state.transition(RevisionEvent::Cancelled, 1, &policy()),
                Ok(RevisionState::Exhausted {
                    reason: ExhaustReason::Cancelled
                })
            );
        }
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let accepted = RevisionState::Accepted {
            reason: AcceptReason::MetThreshold,
        };
        assert!(matches!(
            accepted.transition(RevisionEvent::BeginRevision, 1, &policy()),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(accepted
            .transition(RevisionEvent::Cancelled, 1, &policy())
            .is_err());
    }

    #[test]
    fn test_out_of_order_event_rejected() {
        let err = RevisionState::Drafted
            .transition(RevisionEvent::BeginRevision, 1, &policy())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid revision transition: drafted cannot handle begin_revision"
        );
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_string(&RevisionState::Accepted {
            reason: AcceptReason::AttemptsExhausted,
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"accepted","reason":"attempts_exhausted"}"#);
    }
}
