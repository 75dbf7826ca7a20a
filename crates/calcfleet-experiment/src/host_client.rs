//! Client wrapper around the host agent's endpoint.

use calcfleet_agents::AgentChannel;
use calcfleet_protocol::{Message, Role, SendMessageResult, TaskState};
use calcfleet_types::{extract_last_decimal, parse_decimal, Decimal, RemoteError};

/// Outcome of one host agent invocation. Read-only to callers.
#[derive(Debug, Clone)]
pub struct HostExecution {
    pub expression: String,
    pub final_value: Decimal,
    pub messages: Vec<String>,
    pub result: SendMessageResult,
}

impl HostExecution {
    pub fn task_id(&self) -> Option<&str> {
        match &self.result {
            SendMessageResult::Task(task) => Some(&task.id),
            SendMessageResult::Message(message) => message.task_id.as_deref(),
        }
    }
}

/// Convenience wrapper around the host agent's endpoint.
pub struct HostClient {
    channel: AgentChannel,
}

impl HostClient {
    pub fn new(base_url: &str) -> Self {
        HostClient {
            channel: AgentChannel::new(base_url),
        }
    }

    /// Send one expression and mine the response for the message trace
    /// and the final numeric value.
    pub async fn evaluate(&self, expression: &str) -> Result<HostExecution, RemoteError> {
        let result = self.channel.send_text(expression).await?;
        if let SendMessageResult::Task(task) = &result {
            if task.status.state == TaskState::Failed {
                let detail = task
                    .status
                    .message
                    .as_ref()
                    .map(Message::joined_text)
                    .unwrap_or_else(|| "host task failed".to_string());
                return Err(RemoteError::Protocol(detail));
            }
        }
        let messages = collect_messages(&result);
        let final_text = extract_final_text(&result, &messages)?;
        let final_value = parse_final_value(&final_text, &messages)?;
        Ok(HostExecution {
            expression: expression.to_string(),
            final_value,
            messages,
            result,
        })
    }
}

/// Agent-authored texts in chronological order, consecutive duplicates
/// collapsed, the status message last.
fn collect_messages(result: &SendMessageResult) -> Vec<String> {
    let mut outputs: Vec<String> = Vec::new();
    let mut push = |text: String| {
        if !text.is_empty() && outputs.last() != Some(&text) {
            outputs.push(text);
        }
    };
    match result {
        SendMessageResult::Task(task) => {
            for entry in &task.history {
                if entry.role == Role::Agent {
                    push(entry.joined_text());
                }
            }
            if let Some(status_message) = &task.status.message {
                push(status_message.joined_text());
            }
        }
        SendMessageResult::Message(message) => {
            if message.role == Role::Agent {
                push(message.joined_text());
            }
        }
    }
    outputs
}

/// The text the final value is parsed from: the task's status message when
/// present, the bare message otherwise, the last collected text as a last
/// resort.
fn extract_final_text(
    result: &SendMessageResult,
    messages: &[String],
) -> Result<String, RemoteError> {
    let direct = match result {
        SendMessageResult::Task(task) => task
            .status
            .message
            .as_ref()
            .map(Message::joined_text)
            .filter(|text| !text.is_empty()),
        SendMessageResult::Message(message) => {
            Some(message.joined_text()).filter(|text| !text.is_empty())
        }
    };
    direct
        .or_else(|| messages.last().cloned())
        .ok_or(RemoteError::MissingMessage)
}

/// Parse the final value: the final text verbatim, then its last embedded
/// decimal, then the same two attempts over earlier messages in reverse.
fn parse_final_value(final_text: &str, messages: &[String]) -> Result<Decimal, RemoteError> {
    if let Ok(value) = parse_decimal(final_text) {
        return Ok(value);
    }
    if let Some(value) = extract_last_decimal(final_text) {
        return Ok(value);
    }
    for text in messages.iter().rev() {
        if let Ok(value) = parse_decimal(text) {
            return Ok(value);
        }
        if let Some(value) = extract_last_decimal(text) {
            return Ok(value);
        }
    }
    Err(RemoteError::NoNumericResult(final_text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcfleet_protocol::{Task, TaskState, TaskStatus};

    fn task_result(history: Vec<Message>, status_message: Option<Message>) -> SendMessageResult {
        SendMessageResult::Task(Task {
            id: "t-1".to_string(),
            context_id: "c-1".to_string(),
            status: TaskStatus {
                state: TaskState::Completed,
                message: status_message,
            },
            history,
        })
    }

    #[test]
    fn test_collects_agent_messages_and_status_in_order() {
        let result = task_result(
            vec![
                Message::user_text("10+5-3+6"),
                Message::agent_text("Planning expression: 10+5-3+6"),
                Message::agent_text("Step 1: 10 + 5 = 15"),
                Message::agent_text("Step 1: 10 + 5 = 15"),
            ],
            Some(Message::agent_text("18")),
        );
        let messages = collect_messages(&result);
        assert_eq!(
            messages,
            vec![
                "Planning expression: 10+5-3+6".to_string(),
                "Step 1: 10 + 5 = 15".to_string(),
                "18".to_string(),
            ]
        );
    }

    #[test]
    fn test_final_value_prefers_the_status_message() {
        let result = task_result(
            vec![Message::agent_text("Step 3: 12 + 6 = 18")],
            Some(Message::agent_text("18")),
        );
        let messages = collect_messages(&result);
        let final_text = extract_final_text(&result, &messages).unwrap();
        assert_eq!(final_text, "18");
        assert_eq!(
            parse_final_value(&final_text, &messages).unwrap(),
            Decimal::from(18)
        );
    }

    #[test]
    fn test_final_value_falls_back_to_scanning_messages() {
        let messages = vec![
            "Step 2: 15 - 3 = 12".to_string(),
            "all done, see above".to_string(),
        ];
        assert_eq!(
            parse_final_value("all done, see above", &messages).unwrap(),
            Decimal::from(12)
        );
    }

    #[test]
    fn test_wordless_responses_are_an_error() {
        let result = task_result(vec![], None);
        let messages = collect_messages(&result);
        assert!(matches!(
            extract_final_text(&result, &messages),
            Err(RemoteError::MissingMessage)
        ));
        assert!(matches!(
            parse_final_value("nothing here", &[]),
            Err(RemoteError::NoNumericResult(_))
        ));
    }
}
