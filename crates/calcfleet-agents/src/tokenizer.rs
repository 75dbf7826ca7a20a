//! Deterministic fallback parsing of arithmetic expressions.
//!
//! When the planner's reply cannot be used, expressions are tokenized left
//! to right with no operator precedence: a number, then strictly
//! alternating operator/number pairs. A leading `+` or `-` before the
//! first token signs the first number.

use calcfleet_types::{
    parse_decimal, Decimal, DecompositionPlan, DecompositionStep, Operation, TokenizeError,
};

/// One expression token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Decimal),
    Operator(Operation),
}

/// Tokenize an expression into an alternating number/operator sequence.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, TokenizeError> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;
    let mut expect_number = true;
    let mut negative = false;

    while index < chars.len() {
        let ch = chars[index];
        if ch.is_whitespace() {
            index += 1;
            continue;
        }
        if expect_number {
            if (ch == '+' || ch == '-') && tokens.is_empty() {
                negative = ch == '-';
                index += 1;
                continue;
            }
            let start = index;
            while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.') {
                index += 1;
            }
            if start == index {
                return Err(TokenizeError::ExpectedNumber);
            }
            let text: String = chars[start..index].iter().collect();
            let value =
                parse_decimal(&text).map_err(|_| TokenizeError::InvalidNumber(text.clone()))?;
            tokens.push(Token::Number(if negative { -value } else { value }));
            negative = false;
            expect_number = false;
        } else {
            let operation =
                Operation::from_symbol(ch).ok_or(TokenizeError::ExpectedOperator(ch))?;
            tokens.push(Token::Operator(operation));
            expect_number = true;
            index += 1;
        }
    }

    if expect_number {
        return Err(TokenizeError::TrailingOperator);
    }
    Ok(tokens)
}

/// Build a decomposition plan directly from expression text.
pub fn fallback_plan(expression: &str) -> Result<DecompositionPlan, TokenizeError> {
    let mut tokens = tokenize(expression)?.into_iter();
    let initial_value = match tokens.next() {
        Some(Token::Number(value)) => value,
        _ => return Err(TokenizeError::ExpectedNumber),
    };

    let mut steps = Vec::new();
    loop {
        match (tokens.next(), tokens.next()) {
            (None, _) => break,
            (Some(Token::Operator(operation)), Some(Token::Number(operand))) => {
                steps.push(DecompositionStep { operation, operand });
            }
            _ => return Err(TokenizeError::ExpectedNumber),
        }
    }

    Ok(DecompositionPlan {
        initial_value,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcfleet_types::format_decimal;
    use std::str::FromStr;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    fn execute(plan: &DecompositionPlan) -> Decimal {
        let mut current = plan.initial_value;
        for step in &plan.steps {
            current = step.operation.apply(current, step.operand).unwrap();
        }
        current
    }

    #[test]
    fn test_tokenizes_with_and_without_whitespace() {
        let spaced = tokenize("10 - 3 + 2").unwrap();
        let tight = tokenize("10-3+2").unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(spaced.len(), 5);
    }

    #[test]
    fn test_leading_sign_applies_to_first_number() {
        let plan = fallback_plan("-5 + 8").unwrap();
        assert_eq!(plan.initial_value, dec("-5"));
        assert_eq!(execute(&plan), dec("3"));

        let plan = fallback_plan("+5 - 8").unwrap();
        assert_eq!(plan.initial_value, dec("5"));
    }

    #[test]
    fn test_plan_shape_matches_expression() {
        let plan = fallback_plan("10 - 3 + 2").unwrap();
        assert_eq!(plan.initial_value, dec("10"));
        assert_eq!(
            plan.steps,
            vec![
                DecompositionStep {
                    operation: Operation::Sub,
                    operand: dec("3"),
                },
                DecompositionStep {
                    operation: Operation::Add,
                    operand: dec("2"),
                },
            ]
        );
        assert_eq!(execute(&plan), dec("9"));
    }

    #[test]
    fn test_evaluation_is_strictly_left_to_right() {
        // 2 + 3 * 4 is (2 + 3) * 4 under sequential semantics, not 14.
        let plan = fallback_plan("2 + 3 * 4").unwrap();
        assert_eq!(execute(&plan), dec("20"));
    }

    #[test]
    fn test_fractional_operands_are_exact() {
        let plan = fallback_plan("1.5 * 4 / 2").unwrap();
        assert_eq!(format_decimal(execute(&plan)), "3");
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        assert_eq!(fallback_plan(""), Err(TokenizeError::TrailingOperator));
        assert_eq!(fallback_plan("+"), Err(TokenizeError::TrailingOperator));
        assert_eq!(fallback_plan("3 +"), Err(TokenizeError::TrailingOperator));
        assert_eq!(fallback_plan("3 ** 2"), Err(TokenizeError::ExpectedNumber));
        assert_eq!(
            fallback_plan("3 % 2"),
            Err(TokenizeError::ExpectedOperator('%'))
        );
        assert_eq!(
            fallback_plan("1.2.3 + 1"),
            Err(TokenizeError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(fallback_plan("a + 1"), Err(TokenizeError::ExpectedNumber));
    }

    #[test]
    fn test_sign_is_only_recognized_before_the_first_token() {
        // "10 + -3" would need a signed operand mid-expression; the
        // tokenizer treats the second '-' as a misplaced operator.
        assert!(fallback_plan("10 + -3").is_err());
    }
}
