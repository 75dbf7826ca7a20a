//! End-to-end tests driving a full cluster on ephemeral ports.

use anyhow::Result;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use calcfleet_agents::{AgentChannel, Planner};
use calcfleet_experiment::{DatasetGenerator, EvaluationPipeline, Experiment, ExperimentConfig};
use calcfleet_types::{Decimal, Operation};
use tempfile::TempDir;

/// Planner that replies with a fixed string. Replying with prose forces
/// the host onto the deterministic fallback tokenizer.
struct ScriptedPlanner(String);

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn complete(&self, _instruction: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn fallback_planner() -> Arc<dyn Planner> {
    Arc::new(ScriptedPlanner(
        "I would rather describe the plan in words.".to_string(),
    ))
}

/// Reserve six distinct ephemeral ports by holding all listeners before
/// releasing any of them.
async fn free_ports() -> Vec<u16> {
    let mut listeners = Vec::new();
    for _ in 0..6 {
        listeners.push(tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    listeners
        .iter()
        .map(|listener| listener.local_addr().unwrap().port())
        .collect()
}

async fn test_config(log_root: &std::path::Path) -> ExperimentConfig {
    let ports = free_ports().await;
    ExperimentConfig {
        toolkit_port: ports[0],
        addition_port: ports[1],
        subtraction_port: ports[2],
        multiplication_port: ports[3],
        division_port: ports[4],
        host_port: ports[5],
        log_root: log_root.to_path_buf(),
        ..ExperimentConfig::default()
    }
}

#[tokio::test]
async fn test_full_pipeline_evaluates_a_four_operand_expression() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let mut experiment = Experiment::with_planner(config, fallback_planner());
    experiment.start().await.unwrap();

    let outcome = experiment.evaluate("10+5-3+6").await.unwrap();
    assert_eq!(outcome.final_value, Decimal::from(18));
    assert_eq!(outcome.expression, "10+5-3+6");

    // The trace ends with the final value and announces the plan first.
    let last = outcome.messages.last().unwrap();
    assert_eq!(Decimal::from_str(last.trim()).unwrap(), Decimal::from(18));
    assert!(outcome.messages[0].starts_with("Planning expression:"));
    assert!(outcome.messages.iter().any(|m| m.starts_with("Plan:")));
    assert!(outcome.task_id().is_some());

    experiment.stop().await.unwrap();
}

#[tokio::test]
async fn test_addition_worker_answers_a_natural_language_prompt() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let addition_url = config.addresses().addition;
    let mut experiment = Experiment::with_planner(config, fallback_planner());
    experiment.start().await.unwrap();

    let channel = AgentChannel::new(&addition_url);
    let result = channel.send_text("Add 12 and 30").await.unwrap();
    assert_eq!(
        AgentChannel::extract_decimal(&result).unwrap(),
        Decimal::from(42)
    );

    experiment.stop().await.unwrap();
}

#[tokio::test]
async fn test_structured_planner_output_drives_execution() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let planner = Arc::new(ScriptedPlanner(
        r#"{"initial_value": 7, "steps": [{"operation": "mul", "operand": 6}]}"#.to_string(),
    ));
    let mut experiment = Experiment::with_planner(config, planner);
    experiment.start().await.unwrap();

    let outcome = experiment.evaluate("7 * 6").await.unwrap();
    assert_eq!(outcome.final_value, Decimal::from(42));

    experiment.stop().await.unwrap();
}

#[tokio::test]
async fn test_division_by_zero_fails_with_a_reported_error() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let mut experiment = Experiment::with_planner(config, fallback_planner());
    experiment.start().await.unwrap();

    let err = experiment.evaluate("10 / 0").await.unwrap_err();
    assert!(err.to_string().contains("failed"), "unexpected error: {err}");

    experiment.stop().await.unwrap();
}

#[tokio::test]
async fn test_malformed_expression_fails_decomposition() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let mut experiment = Experiment::with_planner(config, fallback_planner());
    experiment.start().await.unwrap();

    let err = experiment.evaluate("3 ** 2").await.unwrap_err();
    assert!(
        err.to_string().contains("Unable to decompose expression"),
        "unexpected error: {err}"
    );

    experiment.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_and_stop_are_idempotent_and_teardown_is_complete() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let ports = [
        config.toolkit_port,
        config.addition_port,
        config.subtraction_port,
        config.multiplication_port,
        config.division_port,
        config.host_port,
    ];
    let mut experiment = Experiment::with_planner(config, fallback_planner());

    experiment.start().await.unwrap();
    experiment.start().await.unwrap();
    assert!(experiment.evaluate("1 + 1").await.is_ok());

    experiment.stop().await.unwrap();
    experiment.stop().await.unwrap();

    for port in ports {
        let addr = format!("127.0.0.1:{port}");
        assert!(
            tokio::net::TcpStream::connect(&addr).await.is_err(),
            "port {port} still reachable after stop"
        );
    }
}

#[tokio::test]
async fn test_evaluate_outside_the_started_window_is_a_state_error() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let mut experiment = Experiment::with_planner(config, fallback_planner());

    let err = experiment.evaluate("1 + 1").await.unwrap_err();
    assert!(err.to_string().contains("has not been started"));

    experiment.start().await.unwrap();
    experiment.stop().await.unwrap();

    let err = experiment.evaluate("1 + 1").await.unwrap_err();
    assert!(err.to_string().contains("has not been started"));
}

#[tokio::test]
async fn test_worker_task_logs_are_written_under_the_log_root() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;
    let mut experiment = Experiment::with_planner(config, fallback_planner());
    experiment.start().await.unwrap();

    experiment.evaluate("2 + 3").await.unwrap();
    experiment.stop().await.unwrap();

    let count = |worker: &str| {
        std::fs::read_dir(logs.path().join(worker))
            .map(|entries| entries.count())
            .unwrap_or(0)
    };
    assert_eq!(count("host"), 1);
    assert_eq!(count("addition"), 1);
}

#[tokio::test]
async fn test_generated_dataset_scores_perfectly_through_the_cluster() {
    let logs = TempDir::new().unwrap();
    let config = test_config(logs.path()).await;

    let dataset_path = logs.path().join("dataset.jsonl");
    DatasetGenerator::new(4, 3, vec![Operation::Add, Operation::Sub], Some(99))
        .unwrap()
        .write(&dataset_path)
        .unwrap();

    let report = EvaluationPipeline::new(&dataset_path, config)
        .with_planner(fallback_planner())
        .with_results_dir(logs.path().join("results"))
        .evaluate()
        .await
        .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.correct, 4);
    assert!((report.accuracy - 1.0).abs() < f64::EPSILON);
    assert!(report.mismatches.is_empty());
}
