//! Error taxonomy for the calcfleet cluster.

use thiserror::Error;

/// Malformed expression text rejected by the fallback tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("expected number")]
    ExpectedNumber,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("expected operator, found '{0}'")]
    ExpectedOperator(char),
    #[error("expression cannot end with an operator")]
    TrailingOperator,
}

/// Neither the structured planner path nor the fallback tokenizer produced
/// a valid plan.
#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error("planner request failed: {0}")]
    Planner(String),
    #[error("invalid decomposition response: {reason} (reply was: {reply})")]
    InvalidReply { reason: String, reply: String },
    #[error("unable to tokenize expression '{expression}': {source}")]
    Tokenize {
        expression: String,
        #[source]
        source: TokenizeError,
    },
}

/// A remote worker call failed: transport, protocol-level error payload,
/// or a reply without a parseable numeric value.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote agent error: {0}")]
    Protocol(String),
    #[error("agent response did not include a message")]
    MissingMessage,
    #[error("unable to parse numeric result from '{0}'")]
    NoNumericResult(String),
}

/// Exact-arithmetic failures inside the tool backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero is not allowed")]
    DivisionByZero,
    #[error("invalid decimal value '{0}'")]
    InvalidNumber(String),
    #[error("at least two operands are required")]
    NotEnoughOperands,
}

/// Missing required configuration detected before any server starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{0} must be set to launch the experiment")]
    MissingCredential(&'static str),
}

/// A worker failed to start, crashed, or did not stop within its timeout.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("server '{name}' failed to bind: {message}")]
    Bind { name: String, message: String },
    #[error("server '{name}' did not become ready within {timeout_secs}s")]
    StartTimeout { name: String, timeout_secs: u64 },
    #[error("server '{name}' did not stop within {timeout_secs}s")]
    StopTimeout { name: String, timeout_secs: u64 },
    #[error("server '{name}' terminated abnormally: {message}")]
    Crashed { name: String, message: String },
}

/// `evaluate` was called outside the started window.
#[derive(Debug, Error)]
#[error("experiment has not been started")]
pub struct StateError;
