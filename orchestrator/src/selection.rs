//! Interpreting the selector worker's structured verdict.

use ensemble_protocol::Candidate;
use ensemble_protocol::WorkerPayload;
use serde::Deserialize;

use crate::candidates::last_assistant_text;

/// Parsed selector verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDecision {
    pub chosen_id: String,
}

/// Selector output that could not be interpreted. Fatal: the run terminates
/// with this message and no replay is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionError {
    pub message: String,
}

#[derive(Deserialize)]
struct SelectorVerdict {
    chosen_id: String,
}

/// Interpret a successful selector payload as a verdict object
/// `{"chosen_id": "B"}`. Structured transcripts are reduced to their last
/// assistant text first.
pub fn interpret(payload: &WorkerPayload) -> Result<SelectionDecision, SelectionError> {
    let raw = match payload {
        WorkerPayload::Text { text } => text.clone(),
        WorkerPayload::Messages { messages } => {
            last_assistant_text(messages).ok_or_else(|| SelectionError {
                message: "Selector produced no textual output.".to_string(),
            })?
        }
    };

    let verdict: SelectorVerdict = serde_json::from_str(raw.trim()).map_err(|error| {
        SelectionError {
            message: format!("Failed to parse selector output: {error}"),
        }
    })?;

    Ok(SelectionDecision {
        chosen_id: verdict.chosen_id,
    })
}

/// Find the candidate whose id equals the chosen id, by value equality over
/// the list, never by index.
pub fn find_candidate<'a>(candidates: &'a [Candidate], chosen_id: &str) -> Option<&'a Candidate> {
    candidates.iter().find(|candidate| candidate.id == chosen_id)
}
