//! Wire types shared between the ensemble orchestrator and its host.
//!
//! The host is the step interpreter that actually spawns worker tasks, runs
//! tools, and persists conversation state. The orchestrator only describes
//! the work it wants done ([`HostAction`]) and is resumed with the outcome
//! ([`HostEvent`]). Everything in this crate is plain serde-serializable
//! data; no behavior lives here.

pub mod message;
pub mod worker;

pub use message::ContentPart;
pub use message::Message;
pub use message::Role;
pub use worker::Candidate;
pub use worker::HostAction;
pub use worker::HostEvent;
pub use worker::WorkerInput;
pub use worker::WorkerKind;
pub use worker::WorkerPayload;
pub use worker::WorkerResult;
pub use worker::WorkerSpawnRequest;
