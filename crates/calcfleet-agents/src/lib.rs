//! Agent executors and remote clients for the calcfleet cluster
//!
//! This crate holds the behavior of every agent in the cluster: the host
//! orchestrator that decomposes expressions and delegates steps, the
//! operator workers that answer a single operation by calling the
//! arithmetic toolkit, the planner abstraction with its deterministic
//! fallback tokenizer, and the HTTP clients the agents talk through.

pub mod channel;
pub mod clients;
pub mod executor;
pub mod host;
pub mod planner;
pub mod tokenizer;
pub mod tool_client;
pub mod worker;

pub use channel::AgentChannel;
pub use clients::OperatorClient;
pub use executor::{AgentEvent, AgentExecutor, EventQueue, RequestContext};
pub use host::{HostExecutor, OperatorEndpoints};
pub use planner::{decompose, planning_instruction, LlmPlanner, Planner};
pub use tokenizer::{fallback_plan, tokenize, Token};
pub use tool_client::ToolClient;
pub use worker::WorkerExecutor;
