use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for calcfleet
#[derive(Parser)]
#[command(name = "calcfleet")]
#[command(about = "Arithmetic agent cluster - plan, delegate, and evaluate expressions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Interface the cluster binds to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Root directory for worker task logs
    #[arg(long, default_value = "logs")]
    pub log_root: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one expression against a freshly started cluster
    Evaluate {
        /// Expression to send to the host agent, e.g. "10 + 5 - 3 + 6"
        expression: String,
    },

    /// Generate a random expression dataset with exact answers
    Generate {
        /// Number of samples to generate
        #[arg(long, default_value_t = 100)]
        samples: usize,

        /// Operands per expression (at least 2)
        #[arg(long, default_value_t = 3)]
        operands: usize,

        /// Operator set, e.g. "+-*/" or "+-"
        #[arg(long, default_value = "+-*/")]
        operators: String,

        /// RNG seed for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,

        /// Output path (defaults to data/dataset-<timestamp>.jsonl)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run every sample of a dataset through the cluster and score it
    EvalDataset {
        /// Path to a JSONL dataset produced by `generate`
        dataset: PathBuf,

        /// Directory the evaluation report is written to
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
    },

    /// Run a single worker service in the foreground
    Serve {
        /// Which worker to run
        #[arg(long, value_enum)]
        role: ServeRole,

        /// Port override (defaults to the role's standard port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServeRole {
    Toolkit,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Host,
}
