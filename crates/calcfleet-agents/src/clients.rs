//! Per-operator clients used by the host orchestrator.

use calcfleet_types::{format_decimal, Decimal, Operation, RemoteError};

use crate::channel::AgentChannel;

/// Client for one operator agent.
///
/// Builds the operator's natural-language prompt from two decimals and
/// parses a single decimal out of the worker's free-form reply. Calls on
/// one client are serialized by the underlying channel; distinct clients
/// proceed independently.
pub struct OperatorClient {
    operation: Operation,
    channel: AgentChannel,
}

impl OperatorClient {
    pub fn new(operation: Operation, base_url: &str) -> Self {
        OperatorClient {
            operation,
            channel: AgentChannel::new(base_url),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The prompt phrasing each operator understands.
    pub fn prompt(operation: Operation, lhs: Decimal, rhs: Decimal) -> String {
        let lhs = format_decimal(lhs);
        let rhs = format_decimal(rhs);
        match operation {
            Operation::Add => format!("Add {lhs} and {rhs}"),
            Operation::Sub => format!("Subtract {rhs} from {lhs}"),
            Operation::Mul => format!("Multiply {lhs} by {rhs}"),
            Operation::Div => format!("Divide {lhs} by {rhs}"),
        }
    }

    /// Apply this client's operation to a pair of operands remotely.
    pub async fn apply(&self, lhs: Decimal, rhs: Decimal) -> Result<Decimal, RemoteError> {
        let prompt = Self::prompt(self.operation, lhs, rhs);
        let result = self.channel.send_text(&prompt).await?;
        AgentChannel::extract_decimal(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_prompts_use_canonical_decimal_text() {
        let lhs = Decimal::from_str("12.50").unwrap();
        let rhs = Decimal::from(30);
        assert_eq!(
            OperatorClient::prompt(Operation::Add, lhs, rhs),
            "Add 12.5 and 30"
        );
        assert_eq!(
            OperatorClient::prompt(Operation::Sub, lhs, rhs),
            "Subtract 30 from 12.5"
        );
        assert_eq!(
            OperatorClient::prompt(Operation::Mul, lhs, rhs),
            "Multiply 12.5 by 30"
        );
        assert_eq!(
            OperatorClient::prompt(Operation::Div, lhs, rhs),
            "Divide 12.5 by 30"
        );
    }
}
