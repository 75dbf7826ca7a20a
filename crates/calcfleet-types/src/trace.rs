//! Reaction traces recorded by worker agents.

use serde::{Deserialize, Serialize};

/// A single reasoning/action step captured during one worker invocation.
///
/// Owned exclusively by the request that produced it; never shared across
/// calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionStep {
    pub thought: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// Render a worker result plus its trace the way workers reply over the
/// wire.
pub fn format_trace(result: &str, trace: &[ReactionStep]) -> String {
    if trace.is_empty() {
        return format!("Result: {result}");
    }
    let mut lines = vec![format!("Result: {result}"), "Steps:".to_string()];
    for (index, step) in trace.iter().enumerate() {
        lines.push(format!(
            "  {}. thought={:?} action={} args={} observation={}",
            index + 1,
            step.thought,
            step.action.as_deref().unwrap_or("none"),
            step.arguments
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_else(|| "none".to_string()),
            step.observation.as_deref().unwrap_or("none"),
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_result_without_trace() {
        assert_eq!(format_trace("42", &[]), "Result: 42");
    }

    #[test]
    fn test_trace_lines_are_numbered() {
        let trace = vec![ReactionStep {
            thought: "call the add tool".to_string(),
            action: Some("add".to_string()),
            arguments: Some(serde_json::json!({"operands": ["12", "30"]})),
            observation: Some("42".to_string()),
        }];
        let rendered = format_trace("42", &trace);
        assert!(rendered.starts_with("Result: 42\nSteps:\n  1. "));
        assert!(rendered.contains("action=add"));
        assert!(rendered.contains("observation=42"));
    }
}
