//! Batch evaluation of the host agent against a dataset.

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calcfleet_agents::Planner;
use calcfleet_types::parse_decimal;

use crate::config::ExperimentConfig;
use crate::dataset::load_dataset;
use crate::manager::Experiment;

/// One dataset sample the host got wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mismatch {
    pub expression: String,
    pub expected: String,
    pub actual: String,
    pub messages: Vec<String>,
    pub task_id: Option<String>,
}

/// Accuracy report for one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub timestamp: String,
    pub dataset: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub mismatches: Vec<Mismatch>,
}

/// Runs every dataset sample through one cluster and scores exact matches.
pub struct EvaluationPipeline {
    dataset_path: PathBuf,
    config: ExperimentConfig,
    planner_override: Option<Arc<dyn Planner>>,
    results_dir: PathBuf,
}

impl EvaluationPipeline {
    pub fn new(dataset_path: impl Into<PathBuf>, config: ExperimentConfig) -> Self {
        EvaluationPipeline {
            dataset_path: dataset_path.into(),
            config,
            planner_override: None,
            results_dir: PathBuf::from("results"),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner_override = Some(planner);
        self
    }

    pub fn with_results_dir(mut self, results_dir: impl Into<PathBuf>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    /// Evaluate the whole dataset against one cluster lifetime.
    pub async fn evaluate(&self) -> Result<EvaluationReport> {
        let samples = load_dataset(&self.dataset_path)?;
        ensure!(!samples.is_empty(), "dataset is empty");

        let mut experiment = match &self.planner_override {
            Some(planner) => Experiment::with_planner(self.config.clone(), planner.clone()),
            None => Experiment::new(self.config.clone()),
        };
        experiment.start().await?;

        let run = async {
            let mut correct = 0;
            let mut mismatches = Vec::new();
            for sample in &samples {
                let expected = parse_decimal(&sample.result)
                    .with_context(|| format!("invalid expected value '{}'", sample.result))?;
                let outcome = experiment.evaluate(&sample.expression).await?;
                if outcome.final_value == expected {
                    correct += 1;
                } else {
                    mismatches.push(Mismatch {
                        expression: sample.expression.clone(),
                        expected: sample.result.clone(),
                        actual: outcome.final_value.to_string(),
                        messages: outcome.messages.clone(),
                        task_id: outcome.task_id().map(str::to_string),
                    });
                }
            }
            Ok::<_, anyhow::Error>((correct, mismatches))
        }
        .await;

        let stopped = experiment.stop().await;
        let (correct, mismatches) = run?;
        stopped?;

        let total = samples.len();
        let report = EvaluationReport {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            dataset: self.dataset_path.display().to_string(),
            total,
            correct,
            accuracy: correct as f64 / total as f64,
            mismatches,
        };
        println!(
            "{} evaluated {} samples, accuracy {:.3}",
            "📊".blue(),
            report.total,
            report.accuracy
        );
        Ok(report)
    }

    /// Evaluate and persist the report under the results directory.
    pub async fn run(&self) -> Result<PathBuf> {
        let report = self.evaluate().await?;
        std::fs::create_dir_all(&self.results_dir)?;
        let filename = format!("evaluation-{}.json", Utc::now().format("%Y%m%d-%H%M%S"));
        let output_path = self.results_dir.join(filename);
        write_report(&report, &output_path)?;
        Ok(output_path)
    }
}

fn write_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    let payload = serde_json::to_string_pretty(report)?;
    std::fs::write(path, payload)
        .with_context(|| format!("failed to write report {}", path.display()))
}
