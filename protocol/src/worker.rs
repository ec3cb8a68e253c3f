//! Worker spawn requests, worker results, and the suspend/resume contract.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::message::Message;

/// Identifier selecting which underlying task type the host should spawn
/// (model, profile, tool access). Opaque to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerKind(String);

impl WorkerKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// One labeled implementation proposal from a single fan-out worker.
///
/// Ids are assigned by spawn order ("A", "B", …), stable regardless of
/// completion order or success/failure. Failed workers still produce a
/// candidate whose content carries the error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub content: String,
}

/// Input handed to a spawned worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerInput {
    /// Implementor worker: produce one candidate for the user's request.
    Implement {
        prompt: String,
        history: Vec<Message>,
    },
    /// Selector worker: judge the full ordered candidate list.
    Select { candidates: Vec<Candidate> },
}

/// One fan-out task description, executed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSpawnRequest {
    pub worker_kind: WorkerKind,
    /// Human-readable purpose, for logging and UI only.
    pub purpose: String,
    pub input: WorkerInput,
}

/// A successful worker's primary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerPayload {
    /// Free-form text, the implementor's usual output shape.
    Text { text: String },
    /// Structured transcript, produced by workers that run a full
    /// conversation of their own.
    Messages { messages: Vec<Message> },
}

/// Terminal outcome of one worker, order-aligned with the spawn request
/// list: position i of the result list corresponds to request i, never
/// reordered by arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResult {
    Success { payload: WorkerPayload },
    Failure { error_message: String },
}

impl WorkerResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success {
            payload: WorkerPayload::Text { text: text.into() },
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: error_message.into(),
        }
    }
}

/// Outbound suspension action: what the orchestrator wants the host to do
/// before resuming it. `EmitOutput` is terminal: exactly one per run,
/// always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostAction {
    SpawnBatch { requests: Vec<WorkerSpawnRequest> },
    RewriteHistory { messages: Vec<Message> },
    ReplayText { text: String },
    EmitOutput { payload: serde_json::Value },
}

/// Resumption value handed back by the host after it performs an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The history rewrite was installed.
    HistoryRewritten,
    /// Terminal results for a spawn batch, order-aligned with the requests.
    WorkerResults { results: Vec<WorkerResult> },
    /// The full live conversation after a replay, in order. The orchestrator
    /// slices it by position against lengths it recorded earlier.
    Replayed { conversation: Vec<Message> },
}
