//! Error types for the orchestrator runtime.
//!
//! These cover protocol misuse between orchestrator and host only. Worker
//! failures, selector failures, and integrity failures are all normal data:
//! they flow into candidates or into the terminal output payload.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The host resumed a run that already emitted its output.
    #[error("run already finished; no further resumption is accepted")]
    RunFinished,

    /// The host resumed with an event that does not answer the pending
    /// suspension.
    #[error("unexpected resumption event in phase `{phase}`: expected {expected}")]
    UnexpectedEvent {
        phase: &'static str,
        expected: &'static str,
    },

    /// `resume` was called before `start`.
    #[error("run has not been started")]
    NotStarted,
}
