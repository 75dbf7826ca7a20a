//! Core types shared across the calcfleet crates
//!
//! This crate provides the decimal primitive, the operation enum, the
//! decomposition plan types, reaction traces, and the error taxonomy used
//! by every other crate in the workspace.

pub mod decimal;
pub mod error;
pub mod operation;
pub mod plan;
pub mod trace;

pub use decimal::{extract_decimals, extract_last_decimal, format_decimal, parse_decimal};
pub use error::{
    ArithmeticError, ConfigurationError, DecompositionError, LifecycleError, RemoteError,
    StateError, TokenizeError,
};
pub use operation::Operation;
pub use plan::{DecompositionPlan, DecompositionStep};
pub use trace::{format_trace, ReactionStep};

pub use rust_decimal::Decimal;

// ============================================================================
// Constants
// ============================================================================

/// Default model identifier used when `LLM_MODEL` is not set
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Environment key carrying the planner credential
pub const LLM_API_KEY_VAR: &str = "LLM_API_KEY";

/// Environment key carrying the planner model identifier
pub const LLM_MODEL_VAR: &str = "LLM_MODEL";
