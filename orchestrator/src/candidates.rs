//! Labeling worker results as candidates.

use ensemble_protocol::Candidate;
use ensemble_protocol::Message;
use ensemble_protocol::Role;
use ensemble_protocol::WorkerPayload;
use ensemble_protocol::WorkerResult;

/// Candidate id for a spawn-order index: 0 → "A", 1 → "B", … Fan-out is
/// clamped well below 26, so ids stay single uppercase letters.
pub fn letter_id(index: usize) -> String {
    let letter = b'A' + (index % 26) as u8;
    (letter as char).to_string()
}

/// Turn one worker result into a labeled candidate.
///
/// The id comes from the spawn-order index, never from arrival order. A
/// failed worker is not dropped; it becomes a candidate whose content is
/// the error text, left to the selector's judgment.
pub fn extract(result: &WorkerResult, index: usize) -> Candidate {
    let id = letter_id(index);
    let content = match result {
        WorkerResult::Success { payload } => payload_text(payload),
        WorkerResult::Failure { error_message } => format!("Error: {error_message}"),
    };
    Candidate { id, content }
}

fn payload_text(payload: &WorkerPayload) -> String {
    match payload {
        WorkerPayload::Text { text } => text.clone(),
        // Structured transcripts: the candidate is the last assistant
        // message that carries any text. None found is an empty candidate,
        // not an error.
        WorkerPayload::Messages { messages } => {
            last_assistant_text(messages).unwrap_or_default()
        }
    }
}

/// Search backward for the last assistant message containing a text-typed
/// content part and return its text.
pub(crate) fn last_assistant_text(messages: &[Message]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant && message.has_text())
        .map(Message::joined_text)
}
