//! Bounded revision: policy, state machine and per-attempt audit records.

pub mod attempt;
pub mod policy;
pub mod state;

pub use attempt::{AttemptOutcome, PendingAttempt, RevisionAttempt, RevisionOutcome};
pub use policy::{MAX_ATTEMPTS, REVISION_QUALITY_THRESHOLD, REVISION_TOKEN_BUDGET, RevisionPolicy};
pub use state::{AcceptReason, ExhaustReason, RevisionEvent, RevisionState};
