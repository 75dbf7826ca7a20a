//! Operator worker: answers a single operation by calling the toolkit.

use async_trait::async_trait;
use tokio::sync::Mutex;

use calcfleet_types::{
    extract_decimals, format_decimal, format_trace, Decimal, Operation, ReactionStep, RemoteError,
};

use crate::executor::{AgentExecutor, EventQueue, RequestContext};
use crate::tool_client::ToolClient;

/// Executor for one operator agent.
///
/// Parses the operands out of the inbound prompt, delegates the arithmetic
/// to the toolkit backend, and replies with the result plus the recorded
/// reaction trace. Runs are serialized so the backend session never sees
/// overlapping calls from one worker.
pub struct WorkerExecutor {
    operation: Operation,
    tool_client: ToolClient,
    state: Mutex<WorkerState>,
}

#[derive(Default)]
struct WorkerState {
    initialized: bool,
}

impl WorkerExecutor {
    pub fn new(operation: Operation, toolkit_url: &str) -> Self {
        WorkerExecutor {
            operation,
            tool_client: ToolClient::new(toolkit_url),
            state: Mutex::new(WorkerState::default()),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Pull the operands out of a natural-language prompt, in the order
    /// the operation consumes them.
    ///
    /// `Subtract 7 from 20` names the subtrahend first, so the two
    /// operands swap; every other phrasing is consumed in order of
    /// appearance.
    pub fn parse_operands(operation: Operation, prompt: &str) -> Vec<Decimal> {
        let mut operands = extract_decimals(prompt);
        if operation == Operation::Sub
            && operands.len() == 2
            && prompt.to_lowercase().contains(" from ")
        {
            operands.swap(0, 1);
        }
        operands
    }

    async fn run(&self, prompt: &str) -> Result<(String, Vec<ReactionStep>), RemoteError> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            let tools = self.tool_client.list_tools().await?;
            if !tools.iter().any(|name| name == self.operation.name()) {
                return Err(RemoteError::Protocol(format!(
                    "toolkit does not expose the '{}' tool",
                    self.operation.name()
                )));
            }
            state.initialized = true;
        }

        let operands = Self::parse_operands(self.operation, prompt);
        if operands.len() < 2 {
            return Err(RemoteError::NoNumericResult(prompt.to_string()));
        }

        let arguments = serde_json::json!({
            "operands": operands.iter().map(|v| format_decimal(*v)).collect::<Vec<_>>(),
        });
        let mut step = ReactionStep {
            thought: format!(
                "The request needs the '{}' tool; never compute locally.",
                self.operation.name()
            ),
            action: Some(self.operation.name().to_string()),
            arguments: Some(arguments),
            observation: None,
        };

        let result = self.tool_client.call(self.operation, &operands).await?;
        let answer = format_decimal(result);
        step.observation = Some(answer.clone());
        Ok((answer, vec![step]))
    }
}

#[async_trait]
impl AgentExecutor for WorkerExecutor {
    async fn execute(&self, context: &RequestContext, queue: &EventQueue) {
        let prompt = context.user_input().trim().to_string();
        if prompt.is_empty() {
            queue.agent_message("Please provide an expression to evaluate.");
            return;
        }

        match self.run(&prompt).await {
            Ok((answer, trace)) => queue.agent_message(format_trace(&answer, &trace)),
            Err(err) => queue.agent_message(format!("Failed to process request: {err}")),
        }
    }

    async fn cancel(&self, _context: &RequestContext, queue: &EventQueue) {
        queue.agent_message("Cancellation not supported.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_operands_are_taken_in_order_of_appearance() {
        assert_eq!(
            WorkerExecutor::parse_operands(Operation::Add, "Add 12 and 30"),
            vec![dec("12"), dec("30")]
        );
        assert_eq!(
            WorkerExecutor::parse_operands(Operation::Div, "Divide 20 by 4"),
            vec![dec("20"), dec("4")]
        );
    }

    #[test]
    fn test_subtract_from_phrasing_swaps_the_pair() {
        assert_eq!(
            WorkerExecutor::parse_operands(Operation::Sub, "Subtract 7 from 20"),
            vec![dec("20"), dec("7")]
        );
        // Plain infix keeps its order.
        assert_eq!(
            WorkerExecutor::parse_operands(Operation::Sub, "Compute 50 - 13"),
            vec![dec("50"), dec("13")]
        );
    }
}
