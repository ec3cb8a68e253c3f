//! Core run state machine.
//!
//! A run is a sequence of synchronous steps separated by explicit suspension
//! points: the orchestrator hands the host one [`HostAction`] per phase and
//! is resumed with one [`HostEvent`]. It never runs anything concurrently
//! itself; the host owns fan-out, fan-in, cancellation, and timeouts. At
//! most four suspensions occur per run: an optional history rewrite
//! (fixed-pattern only), the batched worker fan-out, the selector spawn,
//! and the replay. `EmitOutput` is terminal, exactly once per run.

use ensemble_protocol::Candidate;
use ensemble_protocol::ContentPart;
use ensemble_protocol::HostAction;
use ensemble_protocol::HostEvent;
use ensemble_protocol::Message;
use ensemble_protocol::Role;
use ensemble_protocol::WorkerInput;
use ensemble_protocol::WorkerKind;
use ensemble_protocol::WorkerResult;
use ensemble_protocol::WorkerSpawnRequest;
use serde_json::Value;
use serde_json::json;
use uuid::Uuid;

use crate::candidates;
use crate::errors::OrchestratorError;
use crate::history::trim_trailing_user;
use crate::policy::Policy;
use crate::selection;

/// Synthetic failure installed for every spawn request the host's result
/// collection omitted.
pub const MISSING_RESULT_ERROR: &str = "Error extracting spawn results";

/// Terminal error when the selector names an id absent from the candidates.
pub const CHOSEN_NOT_FOUND_ERROR: &str = "Failed to find chosen implementation.";

enum Phase {
    Created,
    AwaitingHistoryRewrite,
    AwaitingWorkerResults,
    /// Conversation length recorded immediately before the selector spawn;
    /// the fixed-pattern output slices against it.
    AwaitingSelection { base_len: usize },
    /// Conversation length recorded immediately before the replay
    /// suspension (diversity) or carried over from the selector spawn
    /// (fixed-pattern).
    AwaitingReplay { chosen: Candidate, base_len: usize },
    Finished,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::AwaitingHistoryRewrite => "awaiting_history_rewrite",
            Phase::AwaitingWorkerResults => "awaiting_worker_results",
            Phase::AwaitingSelection { .. } => "awaiting_selection",
            Phase::AwaitingReplay { .. } => "awaiting_replay",
            Phase::Finished => "finished",
        }
    }
}

/// One best-of-N run. Created per invocation, mutated per phase, and
/// discarded once the terminal output action is emitted; nothing persists
/// across process restarts.
pub struct OrchestratorRun {
    run_id: Uuid,
    policy: Policy,
    prompt: String,
    history: Vec<Message>,
    worker_kinds: Vec<WorkerKind>,
    candidates: Vec<Candidate>,
    phase: Phase,
}

impl OrchestratorRun {
    /// Create a run for one user request. `requested_n` is the raw fan-out
    /// count from the request; the policy clamps and defaults it.
    pub fn new(
        policy: Policy,
        prompt: impl Into<String>,
        requested_n: Option<u32>,
        history: Vec<Message>,
    ) -> Self {
        let worker_kinds = policy.select_workers(requested_n);
        Self {
            run_id: Uuid::new_v4(),
            policy,
            prompt: prompt.into(),
            history,
            worker_kinds,
            candidates: Vec::new(),
            phase: Phase::Created,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Ordered candidates extracted so far (empty until worker results
    /// arrive). Discarded with the run.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Issue the first suspension action. The fixed-pattern variant rewrites
    /// the live history before any worker spawn; diversity fans out
    /// immediately.
    pub fn start(&mut self) -> Result<HostAction, OrchestratorError> {
        if !matches!(self.phase, Phase::Created) {
            return Err(OrchestratorError::UnexpectedEvent {
                phase: self.phase.name(),
                expected: "a fresh run",
            });
        }
        tracing::info!(
            run_id = %self.run_id,
            variant = self.policy.variant_name(),
            workers = self.worker_kinds.len(),
            "starting best-of-n run"
        );
        if self.policy.trims_history() {
            self.history = trim_trailing_user(&self.history);
            self.phase = Phase::AwaitingHistoryRewrite;
            Ok(HostAction::RewriteHistory {
                messages: self.history.clone(),
            })
        } else {
            Ok(self.spawn_workers())
        }
    }

    /// Resume with the host's answer to the pending suspension. Returns the
    /// next action; after `EmitOutput` any further resumption is an error.
    pub fn resume(&mut self, event: HostEvent) -> Result<HostAction, OrchestratorError> {
        let phase = std::mem::replace(&mut self.phase, Phase::Finished);
        match (phase, event) {
            (Phase::Created, _) => {
                self.phase = Phase::Created;
                Err(OrchestratorError::NotStarted)
            }
            (Phase::Finished, _) => Err(OrchestratorError::RunFinished),
            (Phase::AwaitingHistoryRewrite, HostEvent::HistoryRewritten) => {
                Ok(self.spawn_workers())
            }
            (Phase::AwaitingWorkerResults, HostEvent::WorkerResults { results }) => {
                Ok(self.collect_candidates(results))
            }
            (Phase::AwaitingSelection { base_len }, HostEvent::WorkerResults { results }) => {
                Ok(self.apply_selection(results, base_len))
            }
            (Phase::AwaitingReplay { chosen, base_len }, HostEvent::Replayed { conversation }) => {
                Ok(self.assemble_output(&chosen, base_len, &conversation))
            }
            (phase, _) => {
                let expected = match &phase {
                    Phase::AwaitingHistoryRewrite => "history_rewritten",
                    Phase::AwaitingWorkerResults | Phase::AwaitingSelection { .. } => {
                        "worker_results"
                    }
                    Phase::AwaitingReplay { .. } => "replayed",
                    Phase::Created | Phase::Finished => "nothing",
                };
                let name = phase.name();
                self.phase = phase;
                Err(OrchestratorError::UnexpectedEvent {
                    phase: name,
                    expected,
                })
            }
        }
    }

    /// One batched suspension carrying every fan-out request. The host
    /// resumes once, when it holds a terminal result for each.
    fn spawn_workers(&mut self) -> HostAction {
        let requests: Vec<WorkerSpawnRequest> = self
            .worker_kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| WorkerSpawnRequest {
                worker_kind: kind.clone(),
                purpose: format!("Generate candidate {}", candidates::letter_id(index)),
                input: WorkerInput::Implement {
                    prompt: self.prompt.clone(),
                    history: self.history.clone(),
                },
            })
            .collect();
        tracing::debug!(
            run_id = %self.run_id,
            requests = requests.len(),
            "spawning candidate workers"
        );
        self.phase = Phase::AwaitingWorkerResults;
        HostAction::SpawnBatch { requests }
    }

    fn collect_candidates(&mut self, results: Vec<WorkerResult>) -> HostAction {
        let results = align_results(results, self.worker_kinds.len());
        self.candidates = results
            .iter()
            .enumerate()
            .map(|(index, result)| candidates::extract(result, index))
            .collect();

        let failures = results
            .iter()
            .filter(|result| matches!(result, WorkerResult::Failure { .. }))
            .count();
        if failures > 0 {
            tracing::warn!(
                run_id = %self.run_id,
                failures,
                total = results.len(),
                "some candidate workers failed; their error text stays selectable"
            );
        }

        // Reference length for the fixed-pattern output slice, recorded
        // before the selector spawn.
        let base_len = self.history.len();
        let request = WorkerSpawnRequest {
            worker_kind: self.policy.selector().clone(),
            purpose: "Select the best candidate".to_string(),
            input: WorkerInput::Select {
                candidates: self.candidates.clone(),
            },
        };
        tracing::debug!(
            run_id = %self.run_id,
            candidates = self.candidates.len(),
            "spawning selector"
        );
        self.phase = Phase::AwaitingSelection { base_len };
        HostAction::SpawnBatch {
            requests: vec![request],
        }
    }

    fn apply_selection(&mut self, results: Vec<WorkerResult>, base_len: usize) -> HostAction {
        let result = results
            .into_iter()
            .next()
            .unwrap_or_else(|| WorkerResult::failure(MISSING_RESULT_ERROR));

        let payload = match result {
            WorkerResult::Failure { error_message } => {
                return self.finish_with_error(error_message);
            }
            WorkerResult::Success { payload } => payload,
        };

        let decision = match selection::interpret(&payload) {
            Ok(decision) => decision,
            Err(error) => return self.finish_with_error(error.message),
        };

        let Some(chosen) = selection::find_candidate(&self.candidates, &decision.chosen_id) else {
            tracing::warn!(
                run_id = %self.run_id,
                chosen_id = %decision.chosen_id,
                "selector chose an unknown candidate id"
            );
            return self.finish_with_error(CHOSEN_NOT_FOUND_ERROR.to_string());
        };
        let chosen = chosen.clone();
        tracing::info!(run_id = %self.run_id, chosen_id = %chosen.id, "candidate selected");

        let text = self.policy.filter_for_replay(&chosen.content);
        // Diversity records its reference length here, immediately before
        // the replay suspension; fixed-pattern keeps the pre-selector one.
        let base_len = if self.policy.trims_history() {
            base_len
        } else {
            self.history.len()
        };
        self.phase = Phase::AwaitingReplay { chosen, base_len };
        HostAction::ReplayText { text }
    }

    fn assemble_output(
        &mut self,
        chosen: &Candidate,
        base_len: usize,
        conversation: &[Message],
    ) -> HostAction {
        let appended = conversation.get(base_len..).unwrap_or_default();
        let payload = if self.policy.trims_history() {
            json!({ "messages": appended })
        } else {
            json!({
                "response": chosen.content,
                "toolResults": collect_tool_results(appended),
            })
        };
        self.finish(payload)
    }

    fn finish_with_error(&mut self, message: String) -> HostAction {
        tracing::warn!(run_id = %self.run_id, error = %message, "run terminated without replay");
        self.finish(json!({ "error": message }))
    }

    fn finish(&mut self, payload: Value) -> HostAction {
        tracing::info!(run_id = %self.run_id, "run finished");
        self.phase = Phase::Finished;
        HostAction::EmitOutput { payload }
    }
}

/// Degrade missing result slots to synthetic failures instead of crashing;
/// extra entries beyond the request count are dropped.
fn align_results(mut results: Vec<WorkerResult>, expected: usize) -> Vec<WorkerResult> {
    results.truncate(expected);
    while results.len() < expected {
        results.push(WorkerResult::failure(MISSING_RESULT_ERROR));
    }
    results
}

/// Tool results appended by the replay: within the post-replay delta, find
/// the last assistant message, keep tool-role messages at or after it, and
/// collect the values of their JSON-typed content parts. No assistant
/// message in the delta means no attributable tool results.
fn collect_tool_results(appended: &[Message]) -> Vec<Value> {
    let Some(last_assistant) = appended
        .iter()
        .rposition(|message| message.role == Role::Assistant)
    else {
        return Vec::new();
    };
    appended[last_assistant..]
        .iter()
        .filter(|message| message.role == Role::Tool)
        .flat_map(|message| message.content.iter())
        .filter_map(|part| match part {
            ContentPart::Json { value } => Some(value.clone()),
            ContentPart::Text { .. } => None,
        })
        .collect()
}
