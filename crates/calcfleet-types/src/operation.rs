//! The four supported arithmetic operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ArithmeticError;

/// One of the four binary operations the cluster can delegate.
///
/// Selected once at decomposition time; downstream code dispatches on the
/// variant instead of re-branching on operation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    /// All operations, in the order workers are brought up.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
    ];

    /// Wire name (`add`, `sub`, `mul`, `div`).
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
        }
    }

    /// Infix symbol used when rendering plans and step results.
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '*',
            Operation::Div => '/',
        }
    }

    /// Map an expression operator character to its operation.
    pub fn from_symbol(symbol: char) -> Option<Operation> {
        match symbol {
            '+' => Some(Operation::Add),
            '-' => Some(Operation::Sub),
            '*' => Some(Operation::Mul),
            '/' => Some(Operation::Div),
            _ => None,
        }
    }

    /// Parse a wire name back into an operation.
    pub fn from_name(name: &str) -> Option<Operation> {
        match name {
            "add" => Some(Operation::Add),
            "sub" => Some(Operation::Sub),
            "mul" => Some(Operation::Mul),
            "div" => Some(Operation::Div),
            _ => None,
        }
    }

    /// Apply the operation to a pair of operands exactly.
    pub fn apply(self, lhs: Decimal, rhs: Decimal) -> Result<Decimal, ArithmeticError> {
        match self {
            Operation::Add => Ok(lhs + rhs),
            Operation::Sub => Ok(lhs - rhs),
            Operation::Mul => Ok(lhs * rhs),
            Operation::Div => lhs.checked_div(rhs).ok_or(ArithmeticError::DivisionByZero),
        }
    }

    /// Fold the operation over two or more operands, left to right.
    ///
    /// This is the tool-backend contract: `div [20, 2, 2]` divides the
    /// first operand by each subsequent one in order.
    pub fn fold(self, operands: &[Decimal]) -> Result<Decimal, ArithmeticError> {
        if operands.len() < 2 {
            return Err(ArithmeticError::NotEnoughOperands);
        }
        let mut accumulator = operands[0];
        for operand in &operands[1..] {
            accumulator = self.apply(accumulator, *operand)?;
        }
        Ok(accumulator)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
