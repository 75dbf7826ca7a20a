//! Builders for the six worker applications.

use anyhow::Result;
use axum::Router;
use std::path::Path;
use std::sync::Arc;

use calcfleet_agents::{HostExecutor, OperatorEndpoints, Planner, WorkerExecutor};
use calcfleet_logging::FileTaskStore;
use calcfleet_protocol::{AgentCard, AgentSkill};
use calcfleet_server::{toolkit_router, AgentApp};
use calcfleet_types::Operation;

/// The arithmetic toolkit backend app.
pub fn build_toolkit_app() -> Router {
    toolkit_router()
}

/// One operator agent app, delegating its operation to the toolkit.
pub fn build_operator_app(
    operation: Operation,
    public_url: &str,
    toolkit_url: &str,
    log_dir: &Path,
) -> Result<Router> {
    let card = operator_card(operation, public_url);
    let executor = Arc::new(WorkerExecutor::new(operation, toolkit_url));
    let task_store = Arc::new(FileTaskStore::new(log_dir)?);
    Ok(AgentApp::new(card, executor, task_store).router())
}

/// The host orchestrator app.
pub fn build_host_app(
    planner: Arc<dyn Planner>,
    public_url: &str,
    endpoints: &OperatorEndpoints,
    log_dir: &Path,
) -> Result<Router> {
    let skill = AgentSkill {
        id: "arithmetic_planning".to_string(),
        name: "Arithmetic Planner".to_string(),
        description: "Breaks expressions into arithmetic subtasks".to_string(),
        tags: string_vec(&["math", "planner", "arithmetic"]),
        examples: string_vec(&["Evaluate 10 - 3 + 2", "Compute 50 + 25 - 5"]),
    };
    let card = AgentCard::text_agent(
        "Arithmetic Host Agent",
        "Routes expressions to the operator agents",
        public_url,
        skill,
    );
    let executor = Arc::new(HostExecutor::new(planner, endpoints));
    let task_store = Arc::new(FileTaskStore::new(log_dir)?);
    Ok(AgentApp::new(card, executor, task_store).router())
}

fn operator_card(operation: Operation, public_url: &str) -> AgentCard {
    let (skill_name, skill_description, tags, examples, agent_name, agent_description) =
        match operation {
            Operation::Add => (
                "Addition",
                "Adds numbers via the toolkit add tool",
                &["math", "addition", "sum"][..],
                &["Add 12 and 30", "What is the sum of 5 and 9?"][..],
                "Toolkit Addition Agent",
                "Provides addition by delegating to the toolkit add tool",
            ),
            Operation::Sub => (
                "Subtraction",
                "Subtracts numbers via the toolkit sub tool",
                &["math", "subtraction", "difference"][..],
                &["Subtract 7 from 20", "Compute 50 - 13"][..],
                "Toolkit Subtraction Agent",
                "Provides subtraction by delegating to the toolkit sub tool",
            ),
            Operation::Mul => (
                "Multiplication",
                "Multiplies numbers via the toolkit mul tool",
                &["math", "multiplication", "product"][..],
                &["Multiply 6 by 7", "What is 12 times 12?"][..],
                "Toolkit Multiplication Agent",
                "Provides multiplication by delegating to the toolkit mul tool",
            ),
            Operation::Div => (
                "Division",
                "Divides numbers via the toolkit div tool",
                &["math", "division", "quotient"][..],
                &["Divide 20 by 4", "What is 100 over 8?"][..],
                "Toolkit Division Agent",
                "Provides division by delegating to the toolkit div tool",
            ),
        };

    AgentCard::text_agent(
        agent_name,
        agent_description,
        public_url,
        AgentSkill {
            id: operation.name().to_string(),
            name: skill_name.to_string(),
            description: skill_description.to_string(),
            tags: string_vec(tags),
            examples: string_vec(examples),
        },
    )
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
