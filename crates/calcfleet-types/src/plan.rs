//! Decomposition plan types produced by the planner and consumed by the
//! host orchestrator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::format_decimal;
use crate::operation::Operation;

/// One delegated step: an operation and its right-hand operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionStep {
    pub operation: Operation,
    pub operand: Decimal,
}

/// An initial value plus an ordered sequence of steps.
///
/// Executing the steps left to right against `initial_value` reproduces
/// the original expression's result. Created fresh per evaluation and
/// discarded after execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPlan {
    pub initial_value: Decimal,
    pub steps: Vec<DecompositionStep>,
}

impl DecompositionPlan {
    /// Render the plan the way the host announces it before execution.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "Plan:".to_string(),
            format!("  start = {}", format_decimal(self.initial_value)),
        ];
        for (index, step) in self.steps.iter().enumerate() {
            lines.push(format!(
                "  {}. {} {}",
                index + 1,
                step.operation.symbol(),
                format_decimal(step.operand)
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserializes_from_planner_json() {
        let json = r#"{
            "initial_value": 10,
            "steps": [
                {"operation": "sub", "operand": 3},
                {"operation": "add", "operand": 2}
            ]
        }"#;
        let plan: DecompositionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.initial_value, Decimal::from(10));
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].operation, Operation::Sub);
        assert_eq!(plan.steps[1].operand, Decimal::from(2));
    }

    #[test]
    fn test_rejects_unknown_operations() {
        let json = r#"{"initial_value": 1, "steps": [{"operation": "mod", "operand": 2}]}"#;
        assert!(serde_json::from_str::<DecompositionPlan>(json).is_err());
    }

    #[test]
    fn test_renders_itemized_plan() {
        let plan = DecompositionPlan {
            initial_value: Decimal::from(10),
            steps: vec![
                DecompositionStep {
                    operation: Operation::Sub,
                    operand: Decimal::from(3),
                },
                DecompositionStep {
                    operation: Operation::Add,
                    operand: Decimal::from_str("2.5").unwrap(),
                },
            ],
        };
        assert_eq!(plan.render(), "Plan:\n  start = 10\n  1. - 3\n  2. + 2.5");
    }
}
