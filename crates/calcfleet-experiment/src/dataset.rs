//! Random arithmetic expression datasets with exact answers.

use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use calcfleet_types::{format_decimal, Decimal, Operation};

/// One dataset entry: expression text and its canonical expected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSample {
    pub expression: String,
    pub result: String,
}

/// Generates random left-to-right expressions with deterministic answers.
pub struct DatasetGenerator {
    sample_count: usize,
    operand_count: usize,
    operators: Vec<Operation>,
    value_range: (i64, i64),
    rng: StdRng,
}

impl DatasetGenerator {
    pub fn new(
        sample_count: usize,
        operand_count: usize,
        operators: Vec<Operation>,
        seed: Option<u64>,
    ) -> Result<Self> {
        ensure!(operand_count >= 2, "operand count must be at least 2");
        ensure!(!operators.is_empty(), "at least one operator must be provided");
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(DatasetGenerator {
            sample_count,
            operand_count,
            operators,
            value_range: (1, 100),
            rng,
        })
    }

    pub fn with_value_range(mut self, low: i64, high: i64) -> Self {
        self.value_range = (low, high);
        self
    }

    /// Produce the configured number of samples.
    pub fn generate(&mut self) -> Vec<DatasetSample> {
        let (low, high) = self.value_range;
        (0..self.sample_count)
            .map(|_| {
                let operands: Vec<i64> = (0..self.operand_count)
                    .map(|_| self.rng.gen_range(low..=high))
                    .collect();
                let operators: Vec<Operation> = (0..self.operand_count - 1)
                    .map(|_| self.operators[self.rng.gen_range(0..self.operators.len())])
                    .collect();
                DatasetSample {
                    expression: build_expression(&operands, &operators),
                    result: format_decimal(compute_result(&operands, &operators)),
                }
            })
            .collect()
    }

    /// Generate and write the dataset as JSON lines.
    pub fn write(&mut self, output_path: &Path) -> Result<PathBuf> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::File::create(output_path)
            .with_context(|| format!("failed to create {}", output_path.display()))?;
        let samples = self.generate();
        for sample in &samples {
            writeln!(file, "{}", serde_json::to_string(sample)?)?;
        }
        Ok(output_path.to_path_buf())
    }
}

fn build_expression(operands: &[i64], operators: &[Operation]) -> String {
    let mut parts = vec![operands[0].to_string()];
    for (operator, operand) in operators.iter().zip(&operands[1..]) {
        parts.push(operator.symbol().to_string());
        parts.push(operand.to_string());
    }
    parts.join(" ")
}

fn compute_result(operands: &[i64], operators: &[Operation]) -> Decimal {
    let mut result = Decimal::from(operands[0]);
    for (operator, operand) in operators.iter().zip(&operands[1..]) {
        // Operand range starts at 1, so division never hits zero here.
        result = operator
            .apply(result, Decimal::from(*operand))
            .expect("generated operands are non-zero");
    }
    result
}

/// Load a JSONL dataset back from disk, ignoring blank lines.
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetSample>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("dataset not found: {}", path.display()))?;
    let mut samples = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        samples.push(serde_json::from_str(line).context("invalid dataset line")?);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcfleet_types::parse_decimal;
    use tempfile::TempDir;

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let operators = vec![Operation::Add, Operation::Sub];
        let first = DatasetGenerator::new(5, 3, operators.clone(), Some(123))
            .unwrap()
            .generate();
        let second = DatasetGenerator::new(5, 3, operators, Some(123))
            .unwrap()
            .generate();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_recorded_results_match_left_to_right_evaluation() {
        let mut generator =
            DatasetGenerator::new(20, 4, Operation::ALL.to_vec(), Some(7)).unwrap();
        for sample in generator.generate() {
            let plan = calcfleet_agents::fallback_plan(&sample.expression).unwrap();
            let mut current = plan.initial_value;
            for step in &plan.steps {
                current = step.operation.apply(current, step.operand).unwrap();
            }
            assert_eq!(format_decimal(current), sample.result, "{}", sample.expression);
            assert!(parse_decimal(&sample.result).is_ok());
        }
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert!(DatasetGenerator::new(1, 1, vec![Operation::Add], None).is_err());
        assert!(DatasetGenerator::new(1, 2, vec![], None).is_err());
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/dataset.jsonl");
        let mut generator =
            DatasetGenerator::new(3, 2, vec![Operation::Mul], Some(42)).unwrap();
        generator.write(&path).unwrap();
        let samples = load_dataset(&path).unwrap();
        assert_eq!(samples.len(), 3);
    }
}
