//! Experiment lifecycle management for the calcfleet cluster
//!
//! The [`Experiment`] façade assigns addresses, brings the six worker
//! services up, exposes a single `evaluate` call against the host agent,
//! and guarantees teardown in reverse start order. Dataset generation and
//! batch evaluation live here too, as thin plumbing around the cluster.

pub mod config;
pub mod dataset;
pub mod evaluation;
pub mod host_client;
pub mod manager;
pub mod servers;

pub use config::{AgentAddresses, ExperimentConfig};
pub use dataset::{DatasetGenerator, DatasetSample};
pub use evaluation::{EvaluationPipeline, EvaluationReport};
pub use host_client::{HostClient, HostExecution};
pub use manager::{run_single_expression, Experiment};
