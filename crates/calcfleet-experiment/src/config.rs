//! Configuration objects for experiment orchestration.

use std::env;
use std::path::PathBuf;

use calcfleet_agents::OperatorEndpoints;
use calcfleet_types::{ConfigurationError, DEFAULT_LLM_MODEL, LLM_API_KEY_VAR, LLM_MODEL_VAR};

/// Settings for launching the arithmetic agent cluster.
///
/// Immutable for the lifetime of one [`crate::Experiment`].
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub host: String,
    pub toolkit_port: u16,
    pub addition_port: u16,
    pub subtraction_port: u16,
    pub multiplication_port: u16,
    pub division_port: u16,
    pub host_port: u16,
    pub log_root: PathBuf,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            host: "127.0.0.1".to_string(),
            toolkit_port: 18200,
            addition_port: 18201,
            subtraction_port: 18202,
            multiplication_port: 18203,
            division_port: 18204,
            host_port: 18205,
            log_root: PathBuf::from("logs"),
            llm_model: env::var(LLM_MODEL_VAR).unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_api_key: None,
        }
    }
}

impl ExperimentConfig {
    /// Compute every service address from the host plus the six ports.
    pub fn addresses(&self) -> AgentAddresses {
        let base = format!("http://{}", self.host);
        AgentAddresses {
            toolkit: format!("{base}:{}", self.toolkit_port),
            addition: format!("{base}:{}", self.addition_port),
            subtraction: format!("{base}:{}", self.subtraction_port),
            multiplication: format!("{base}:{}", self.multiplication_port),
            division: format!("{base}:{}", self.division_port),
            host: format!("{base}:{}", self.host_port),
        }
    }

    /// The planner credential: the config field wins, then the
    /// environment, read once here and never re-read.
    pub fn resolve_api_key(&self) -> Result<String, ConfigurationError> {
        self.llm_api_key
            .clone()
            .or_else(|| env::var(LLM_API_KEY_VAR).ok())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingCredential(LLM_API_KEY_VAR))
    }
}

/// Explicit service-discovery snapshot, built once by the experiment and
/// passed by reference into every worker constructor.
#[derive(Debug, Clone)]
pub struct AgentAddresses {
    pub toolkit: String,
    pub addition: String,
    pub subtraction: String,
    pub multiplication: String,
    pub division: String,
    pub host: String,
}

impl AgentAddresses {
    pub fn operator_endpoints(&self) -> OperatorEndpoints {
        OperatorEndpoints {
            addition: self.addition.clone(),
            subtraction: self.subtraction.clone(),
            multiplication: self.multiplication.clone(),
            division: self.division.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_derived_from_host_and_ports() {
        let config = ExperimentConfig::default();
        let addresses = config.addresses();
        assert_eq!(addresses.toolkit, "http://127.0.0.1:18200");
        assert_eq!(addresses.host, "http://127.0.0.1:18205");
    }

    #[test]
    fn test_explicit_api_key_wins_over_environment() {
        let config = ExperimentConfig {
            llm_api_key: Some("sk-test".to_string()),
            ..ExperimentConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "sk-test");
    }
}
