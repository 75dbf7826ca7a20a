//! Host orchestrator: decomposes an expression and delegates each step.

use async_trait::async_trait;
use std::sync::Arc;

use calcfleet_protocol::{Message, TaskState, TaskStatus, TaskStatusUpdateEvent};
use calcfleet_types::{format_decimal, Operation};

use crate::clients::OperatorClient;
use crate::executor::{AgentEvent, AgentExecutor, EventQueue, RequestContext};
use crate::planner::{decompose, Planner};

/// Base URLs of the four operator agents.
#[derive(Debug, Clone)]
pub struct OperatorEndpoints {
    pub addition: String,
    pub subtraction: String,
    pub multiplication: String,
    pub division: String,
}

/// Executor for the host agent.
///
/// Runs the plan strictly in order: each step's left operand is the
/// previous step's result, so there is nothing to fan out. A status event
/// is emitted before execution (the itemized plan), after every step, and
/// once more terminally with the final value or the failure.
pub struct HostExecutor {
    planner: Arc<dyn Planner>,
    addition: OperatorClient,
    subtraction: OperatorClient,
    multiplication: OperatorClient,
    division: OperatorClient,
}

impl HostExecutor {
    pub fn new(planner: Arc<dyn Planner>, endpoints: &OperatorEndpoints) -> Self {
        HostExecutor {
            planner,
            addition: OperatorClient::new(Operation::Add, &endpoints.addition),
            subtraction: OperatorClient::new(Operation::Sub, &endpoints.subtraction),
            multiplication: OperatorClient::new(Operation::Mul, &endpoints.multiplication),
            division: OperatorClient::new(Operation::Div, &endpoints.division),
        }
    }

    fn client_for(&self, operation: Operation) -> &OperatorClient {
        match operation {
            Operation::Add => &self.addition,
            Operation::Sub => &self.subtraction,
            Operation::Mul => &self.multiplication,
            Operation::Div => &self.division,
        }
    }

    fn send_status(
        &self,
        context: &RequestContext,
        queue: &EventQueue,
        text: String,
        state: TaskState,
        is_final: bool,
    ) {
        let mut message = Message::agent_text(text);
        message.task_id = Some(context.task_id.clone());
        message.context_id = Some(context.context_id.clone());
        queue.enqueue(AgentEvent::StatusUpdate(TaskStatusUpdateEvent {
            task_id: context.task_id.clone(),
            context_id: context.context_id.clone(),
            status: TaskStatus {
                state,
                message: Some(message),
            },
            is_final,
        }));
    }
}

#[async_trait]
impl AgentExecutor for HostExecutor {
    async fn execute(&self, context: &RequestContext, queue: &EventQueue) {
        let expression = context.user_input().trim().to_string();
        if expression.is_empty() {
            queue.agent_message("Please provide an arithmetic expression to evaluate.");
            return;
        }

        self.send_status(
            context,
            queue,
            format!("Planning expression: {expression}"),
            TaskState::Working,
            false,
        );

        let plan = match decompose(self.planner.as_ref(), &expression).await {
            Ok(plan) => plan,
            Err(err) => {
                self.send_status(
                    context,
                    queue,
                    format!("Unable to decompose expression: {err}"),
                    TaskState::Failed,
                    true,
                );
                return;
            }
        };

        self.send_status(context, queue, plan.render(), TaskState::Working, false);

        let mut current = plan.initial_value;
        for (index, step) in plan.steps.iter().enumerate() {
            let result = match self.client_for(step.operation).apply(current, step.operand).await
            {
                Ok(value) => value,
                Err(err) => {
                    self.send_status(
                        context,
                        queue,
                        format!(
                            "Step {} ({} {}) failed: {err}",
                            index + 1,
                            step.operation.symbol(),
                            format_decimal(step.operand)
                        ),
                        TaskState::Failed,
                        true,
                    );
                    return;
                }
            };

            self.send_status(
                context,
                queue,
                format!(
                    "Step {}: {} {} {} = {}",
                    index + 1,
                    format_decimal(current),
                    step.operation.symbol(),
                    format_decimal(step.operand),
                    format_decimal(result)
                ),
                TaskState::Working,
                false,
            );
            current = result;
        }

        self.send_status(
            context,
            queue,
            format_decimal(current),
            TaskState::Completed,
            true,
        );
    }

    async fn cancel(&self, _context: &RequestContext, queue: &EventQueue) {
        queue.agent_message("Cancellation is not supported.");
    }
}
