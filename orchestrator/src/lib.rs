//! Best-of-N candidate orchestration.
//!
//! Given one user request, this crate fans out several independent
//! candidate-generation workers, funnels their labeled outputs to a judge
//! worker, and replays the chosen candidate's effects back into the host
//! conversation. It is pure control flow over opaque asynchronous
//! sub-tasks: actual spawning, tool execution, and persistence live in the
//! host, behind the suspend/resume contract of `ensemble-protocol`.

pub mod candidates;
pub mod errors;
pub mod filter;
pub mod history;
pub mod host;
pub mod policy;
pub mod runtime;
pub mod selection;

pub use errors::OrchestratorError;
pub use host::Host;
pub use host::drive;
pub use policy::Policy;
pub use runtime::OrchestratorRun;
