//! Conversation history trimming before worker fan-out.

use ensemble_protocol::Message;
use ensemble_protocol::Role;

/// Drop every trailing user message, stopping at the first non-user message
/// from the end. An all-user (or empty) history empties entirely.
///
/// The fixed-pattern variant installs this prefix before spawning workers so
/// stale trailing instructions are not re-presented; the replay step carries
/// the chosen content instead.
pub fn trim_trailing_user(messages: &[Message]) -> Vec<Message> {
    let keep = messages
        .iter()
        .rposition(|message| message.role != Role::User)
        .map_or(0, |index| index + 1);
    messages[..keep].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drops_trailing_user_run_until_assistant() {
        let history = vec![
            Message::user("please add tests"),
            Message::assistant("sure, done"),
            Message::user("stale instruction"),
            Message::user("another stale one"),
        ];
        let trimmed = trim_trailing_user(&history);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[1].role, Role::Assistant);
    }

    #[test]
    fn all_user_history_empties() {
        let history = vec![Message::user("a"), Message::user("b")];
        assert_eq!(trim_trailing_user(&history), Vec::<Message>::new());
    }

    #[test]
    fn empty_history_stays_empty() {
        assert_eq!(trim_trailing_user(&[]), Vec::<Message>::new());
    }

    #[test]
    fn assistant_tail_is_untouched() {
        let history = vec![Message::user("request"), Message::assistant("answer")];
        assert_eq!(trim_trailing_user(&history), history);
    }
}
