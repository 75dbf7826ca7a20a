use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use calcfleet_agents::LlmPlanner;
use calcfleet_experiment::servers::{build_host_app, build_operator_app, build_toolkit_app};
use calcfleet_experiment::{
    run_single_expression, DatasetGenerator, EvaluationPipeline, ExperimentConfig,
};
use calcfleet_logging::worker_log_dir;
use calcfleet_server::{spawn_server, stop_server};
use calcfleet_types::Operation;

mod cli;

use cli::{Cli, Commands, ServeRole};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ExperimentConfig {
        host: cli.host.clone(),
        log_root: cli.log_root.clone(),
        ..ExperimentConfig::default()
    };

    match cli.command {
        Commands::Evaluate { expression } => run_evaluate(&expression, config).await,
        Commands::Generate {
            samples,
            operands,
            operators,
            seed,
            output,
        } => run_generate(samples, operands, &operators, seed, output),
        Commands::EvalDataset {
            dataset,
            results_dir,
        } => run_eval_dataset(dataset, results_dir, config).await,
        Commands::Serve { role, port } => run_serve(role, port, config).await,
    }
}

async fn run_evaluate(expression: &str, config: ExperimentConfig) -> Result<()> {
    let outcome = run_single_expression(expression, config).await?;

    println!("{}: {}", "Expression".bold(), outcome.expression);
    println!(
        "{}: {}",
        "Final value".bold(),
        outcome.final_value.to_string().green()
    );
    println!("{}:", "Agent messages".bold());
    for line in &outcome.messages {
        for part in line.lines() {
            println!("- {part}");
        }
    }
    if let Some(task_id) = outcome.task_id() {
        println!("{}: {}", "Task ID".bold(), task_id);
    }
    Ok(())
}

fn run_generate(
    samples: usize,
    operands: usize,
    operators: &str,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut operations = Vec::new();
    for symbol in operators.chars() {
        match Operation::from_symbol(symbol) {
            Some(operation) => operations.push(operation),
            None => bail!("unsupported operator '{symbol}' (expected a subset of \"+-*/\")"),
        }
    }

    let output_path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        PathBuf::from("data").join(format!("dataset-{timestamp}.jsonl"))
    });

    let written = DatasetGenerator::new(samples, operands, operations, seed)?
        .write(&output_path)
        .context("failed to write dataset")?;
    println!(
        "{} wrote {} samples to {}",
        "✅".green(),
        samples,
        written.display()
    );
    Ok(())
}

async fn run_eval_dataset(
    dataset: PathBuf,
    results_dir: PathBuf,
    config: ExperimentConfig,
) -> Result<()> {
    let report_path = EvaluationPipeline::new(dataset, config)
        .with_results_dir(results_dir)
        .run()
        .await?;
    println!("{} report written to {}", "✅".green(), report_path.display());
    Ok(())
}

async fn run_serve(role: ServeRole, port: Option<u16>, config: ExperimentConfig) -> Result<()> {
    let addresses = config.addresses();

    let operator = |operation: Operation, name: &'static str, default_port: u16, public_url: &str| {
        let app = build_operator_app(
            operation,
            public_url,
            &addresses.toolkit,
            &worker_log_dir(&config.log_root, name)?,
        )?;
        Ok::<_, anyhow::Error>((name, default_port, app))
    };

    let (name, default_port, router) = match role {
        ServeRole::Toolkit => ("toolkit", config.toolkit_port, build_toolkit_app()),
        ServeRole::Addition => operator(
            Operation::Add,
            "addition",
            config.addition_port,
            &addresses.addition,
        )?,
        ServeRole::Subtraction => operator(
            Operation::Sub,
            "subtraction",
            config.subtraction_port,
            &addresses.subtraction,
        )?,
        ServeRole::Multiplication => operator(
            Operation::Mul,
            "multiplication",
            config.multiplication_port,
            &addresses.multiplication,
        )?,
        ServeRole::Division => operator(
            Operation::Div,
            "division",
            config.division_port,
            &addresses.division,
        )?,
        ServeRole::Host => {
            let api_key = config.resolve_api_key()?;
            let planner = Arc::new(LlmPlanner::new(api_key, config.llm_model.clone()));
            let app = build_host_app(
                planner,
                &addresses.host,
                &addresses.operator_endpoints(),
                &worker_log_dir(&config.log_root, "host")?,
            )?;
            ("host", config.host_port, app)
        }
    };

    let handle = spawn_server(name, &config.host, port.unwrap_or(default_port), router).await?;
    println!("{} press Ctrl-C to stop", "ℹ️".blue());
    tokio::signal::ctrl_c().await?;
    stop_server(handle).await?;
    Ok(())
}
