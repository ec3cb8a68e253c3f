//! Conversation messages as the orchestrator sees them.
//!
//! Histories are append-only ordered sequences; the orchestrator only ever
//! reads and slices them by position, never by matching content.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One part of a message body. Text carries model-visible prose; Json carries
/// structured tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Json { value: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// Single-text-part message, the common case in tests and histories.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// All text-typed parts of this message, joined with newlines.
    /// Empty string if the message carries no text parts.
    pub fn joined_text(&self) -> String {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Json { .. } => None,
            })
            .collect();
        parts.join("\n")
    }

    pub fn has_text(&self) -> bool {
        self.content
            .iter()
            .any(|part| matches!(part, ContentPart::Text { .. }))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn joined_text_skips_json_parts() {
        let message = Message::new(
            Role::Tool,
            vec![
                ContentPart::Text {
                    text: "first".to_string(),
                },
                ContentPart::Json {
                    value: json!({"ok": true}),
                },
                ContentPart::Text {
                    text: "second".to_string(),
                },
            ],
        );
        assert_eq!(message.joined_text(), "first\nsecond");
    }

    #[test]
    fn content_part_wire_shape_is_tagged() {
        let part = ContentPart::Text {
            text: "hi".to_string(),
        };
        let value = serde_json::to_value(&part).expect("serialize");
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }
}
