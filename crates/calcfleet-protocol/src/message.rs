use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One content segment of a message. Only text segments are exchanged in
/// this cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
}

/// A role-tagged message with one or more parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub message_id: String,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

impl Message {
    /// Build a user message with a single text part and a fresh id.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Build an agent message with a single text part and a fresh id.
    pub fn agent_text(text: impl Into<String>) -> Self {
        Self::text(Role::Agent, text)
    }

    fn text(role: Role, text: impl Into<String>) -> Self {
        Message {
            role,
            message_id: Uuid::new_v4().to_string(),
            parts: vec![Part::Text { text: text.into() }],
            task_id: None,
            context_id: None,
        }
    }

    /// Concatenate the text of every part, newline separated.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_round_trips_with_camel_case_fields() {
        let mut message = Message::user_text("Add 1 and 2");
        message.task_id = Some("t-1".to_string());
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["taskId"], "t-1");
        assert_eq!(json["parts"][0]["kind"], "text");
        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_joined_text_concatenates_parts() {
        let mut message = Message::agent_text("first");
        message.parts.push(Part::Text {
            text: "second".to_string(),
        });
        assert_eq!(message.joined_text(), "first\nsecond");
    }
}
