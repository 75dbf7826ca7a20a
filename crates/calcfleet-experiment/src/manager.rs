//! The experiment façade: cluster bring-up, evaluation, teardown.

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use calcfleet_agents::{LlmPlanner, Planner};
use calcfleet_logging::worker_log_dir;
use calcfleet_server::{start_all, stop_all, ServerHandle, ServerSpec};
use calcfleet_types::{Operation, StateError};

use crate::config::ExperimentConfig;
use crate::host_client::{HostClient, HostExecution};
use crate::servers::{build_host_app, build_operator_app, build_toolkit_app};

/// Manages the lifecycle of the arithmetic agent cluster.
///
/// `start` and `stop` are idempotent; a failure during bring-up unwinds
/// the already-started servers in reverse order before propagating. Only
/// one experiment may run per set of ports at a time, and each instance
/// exclusively owns its server handles.
pub struct Experiment {
    config: ExperimentConfig,
    planner_override: Option<Arc<dyn Planner>>,
    handles: Vec<ServerHandle>,
    host_client: Option<HostClient>,
    started: bool,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Self {
        Experiment {
            config,
            planner_override: None,
            handles: Vec::new(),
            host_client: None,
            started: false,
        }
    }

    /// Use a caller-supplied planner instead of the LLM-backed one. With
    /// an override in place no credential is required.
    pub fn with_planner(config: ExperimentConfig, planner: Arc<dyn Planner>) -> Self {
        Experiment {
            planner_override: Some(planner),
            ..Experiment::new(config)
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Bring the cluster up: toolkit, the four operator agents, the host.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        let config = &self.config;
        std::fs::create_dir_all(&config.log_root)?;

        let planner: Arc<dyn Planner> = match &self.planner_override {
            Some(planner) => planner.clone(),
            None => {
                // Fail fast before any server starts.
                let api_key = config.resolve_api_key()?;
                Arc::new(LlmPlanner::new(api_key, config.llm_model.clone()))
            }
        };

        let addresses = config.addresses();

        // Building the applications binds nothing; ports are only taken
        // once the supervisor starts the set.
        let mut specs = vec![ServerSpec::new(
            "toolkit",
            config.toolkit_port,
            build_toolkit_app(),
        )];
        for operation in Operation::ALL {
            let (name, port, public_url) = match operation {
                Operation::Add => ("addition", config.addition_port, &addresses.addition),
                Operation::Sub => ("subtraction", config.subtraction_port, &addresses.subtraction),
                Operation::Mul => (
                    "multiplication",
                    config.multiplication_port,
                    &addresses.multiplication,
                ),
                Operation::Div => ("division", config.division_port, &addresses.division),
            };
            let app = build_operator_app(
                operation,
                public_url,
                &addresses.toolkit,
                &worker_log_dir(&config.log_root, name)?,
            )?;
            specs.push(ServerSpec::new(name, port, app));
        }
        let host_app = build_host_app(
            planner,
            &addresses.host,
            &addresses.operator_endpoints(),
            &worker_log_dir(&config.log_root, "host")?,
        )?;
        specs.push(ServerSpec::new("host", config.host_port, host_app));

        // A failure inside start_all already unwound the started subset.
        self.handles = start_all(&config.host, specs).await?;
        self.host_client = Some(HostClient::new(&addresses.host));
        self.started = true;
        println!("{} experiment cluster is up", "✅".green());
        Ok(())
    }

    /// Tear the cluster down in strict reverse start order.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.host_client = None;
        stop_all(std::mem::take(&mut self.handles)).await;
        self.started = false;
        Ok(())
    }

    /// Evaluate one expression against the running cluster.
    pub async fn evaluate(&self, expression: &str) -> Result<HostExecution> {
        let client = match (&self.host_client, self.started) {
            (Some(client), true) => client,
            _ => return Err(StateError.into()),
        };
        Ok(client.evaluate(expression).await?)
    }
}

/// Run one expression against a freshly started cluster, guaranteeing
/// teardown on both the success and the failure path.
pub async fn run_single_expression(
    expression: &str,
    config: ExperimentConfig,
) -> Result<HostExecution> {
    let mut experiment = Experiment::new(config);
    experiment.start().await?;
    let outcome = experiment.evaluate(expression).await;
    let stopped = experiment.stop().await;
    let outcome = outcome?;
    stopped?;
    Ok(outcome)
}
