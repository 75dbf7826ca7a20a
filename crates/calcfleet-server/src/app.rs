//! The per-agent HTTP application: card discovery plus JSON-RPC dispatch.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use calcfleet_agents::{AgentEvent, AgentExecutor, EventQueue, RequestContext};
use calcfleet_logging::TaskStore;
use calcfleet_protocol::{
    AgentCard, Message, MessageSendParams, SendMessageResponse, SendMessageResult, Task,
    TaskIdParams, TaskState, TaskStatus, AGENT_CARD_PATH, MESSAGE_SEND_METHOD, TASK_CANCEL_METHOD,
};

/// One agent endpoint: a card, an executor, and a task store.
pub struct AgentApp {
    card: AgentCard,
    executor: Arc<dyn AgentExecutor>,
    task_store: Arc<dyn TaskStore>,
}

impl AgentApp {
    pub fn new(
        card: AgentCard,
        executor: Arc<dyn AgentExecutor>,
        task_store: Arc<dyn TaskStore>,
    ) -> Self {
        AgentApp {
            card,
            executor,
            task_store,
        }
    }

    /// Build the router serving this agent.
    pub fn router(self) -> Router {
        let state = Arc::new(self);
        Router::new()
            .route(AGENT_CARD_PATH, get(agent_card))
            .route("/", post(rpc))
            .with_state(state)
    }
}

async fn agent_card(State(app): State<Arc<AgentApp>>) -> Json<AgentCard> {
    Json(app.card.clone())
}

async fn rpc(
    State(app): State<Arc<AgentApp>>,
    Json(raw): Json<serde_json::Value>,
) -> Json<SendMessageResponse> {
    let request_id = raw["id"].as_str().unwrap_or_default().to_string();
    let method = raw["method"].as_str().unwrap_or_default().to_string();

    let response = match method.as_str() {
        MESSAGE_SEND_METHOD => match serde_json::from_value::<MessageSendParams>(raw["params"].clone()) {
            Ok(params) => handle_message_send(&app, request_id.clone(), params).await,
            Err(err) => SendMessageResponse::error(
                request_id.clone(),
                -32602,
                format!("invalid message/send params: {err}"),
            ),
        },
        TASK_CANCEL_METHOD => match serde_json::from_value::<TaskIdParams>(raw["params"].clone()) {
            Ok(params) => handle_cancel(&app, request_id.clone(), params).await,
            Err(err) => SendMessageResponse::error(
                request_id.clone(),
                -32602,
                format!("invalid tasks/cancel params: {err}"),
            ),
        },
        other => SendMessageResponse::error(
            request_id.clone(),
            -32601,
            format!("unknown method '{other}'"),
        ),
    };
    Json(response)
}

/// Run the executor for one inbound message and fold its events into a
/// task record.
///
/// Status updates replace the task's current status, pushing the previous
/// status message into history so the full trace survives. Executors that
/// only emit plain messages produce a message result; the task is
/// persisted either way.
async fn handle_message_send(
    app: &Arc<AgentApp>,
    request_id: String,
    params: MessageSendParams,
) -> SendMessageResponse {
    let task_id = params
        .message
        .task_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let context_id = params
        .message
        .context_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let context = RequestContext {
        message: params.message.clone(),
        task_id: task_id.clone(),
        context_id: context_id.clone(),
    };

    let mut task = Task {
        id: task_id.clone(),
        context_id: context_id.clone(),
        status: TaskStatus {
            state: TaskState::Submitted,
            message: None,
        },
        history: vec![params.message],
    };

    let (queue, mut events) = EventQueue::channel();
    let executor = app.executor.clone();
    let executor_context = context.clone();
    let run = tokio::spawn(async move {
        executor.execute(&executor_context, &queue).await;
    });

    let mut saw_status = false;
    let mut last_plain: Option<Message> = None;
    while let Some(event) = events.recv().await {
        match event {
            AgentEvent::Message(mut message) => {
                message.task_id = Some(task_id.clone());
                message.context_id = Some(context_id.clone());
                task.history.push(message.clone());
                last_plain = Some(message);
            }
            AgentEvent::StatusUpdate(update) => {
                saw_status = true;
                if let Some(previous) = task.status.message.take() {
                    task.history.push(previous);
                }
                task.status = update.status;
            }
        }
    }
    let _ = run.await;

    if !task.status.state.is_terminal() {
        task.status = TaskStatus {
            state: TaskState::Completed,
            message: last_plain.clone().or(task.status.message),
        };
    }

    if let Err(err) = app.task_store.save(&task).await {
        return SendMessageResponse::error(request_id, -32000, format!("failed to persist task: {err}"));
    }

    let result = if !saw_status {
        match last_plain {
            Some(message) => SendMessageResult::Message(message),
            None => SendMessageResult::Task(task),
        }
    } else {
        SendMessageResult::Task(task)
    };
    SendMessageResponse::success(request_id, result)
}

async fn handle_cancel(
    app: &Arc<AgentApp>,
    request_id: String,
    params: TaskIdParams,
) -> SendMessageResponse {
    let context = RequestContext {
        message: Message::user_text(""),
        task_id: params.id.clone(),
        context_id: Uuid::new_v4().to_string(),
    };
    let (queue, mut events) = EventQueue::channel();
    let executor = app.executor.clone();
    let executor_context = context.clone();
    let run = tokio::spawn(async move {
        executor.cancel(&executor_context, &queue).await;
    });

    let mut reply: Option<Message> = None;
    while let Some(event) = events.recv().await {
        if let AgentEvent::Message(message) = event {
            reply = Some(message);
        }
    }
    let _ = run.await;

    match reply {
        Some(message) => SendMessageResponse::success(request_id, SendMessageResult::Message(message)),
        None => SendMessageResponse::error(request_id, -32000, "cancellation produced no reply"),
    }
}
