//! The executor contract shared by every agent in the cluster.

use async_trait::async_trait;
use tokio::sync::mpsc;

use calcfleet_protocol::{Message, TaskStatusUpdateEvent};

/// Event emitted by an executor while handling one request.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A plain agent message; for simple workers this is the whole reply.
    Message(Message),
    /// A task status transition carrying a progress message.
    StatusUpdate(TaskStatusUpdateEvent),
}

/// Write side of the per-request event stream. The request handler drains
/// the read side into the task record.
#[derive(Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<AgentEvent>,
}

impl EventQueue {
    /// Create a queue plus the receiver the request handler drains.
    pub fn channel() -> (EventQueue, mpsc::UnboundedReceiver<AgentEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (EventQueue { sender }, receiver)
    }

    pub fn enqueue(&self, event: AgentEvent) {
        // The receiver only goes away once the handler stops caring.
        let _ = self.sender.send(event);
    }

    /// Enqueue a plain agent text message.
    pub fn agent_message(&self, text: impl Into<String>) {
        self.enqueue(AgentEvent::Message(Message::agent_text(text)));
    }
}

/// Context of one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub message: Message,
    pub task_id: String,
    pub context_id: String,
}

impl RequestContext {
    /// The user's text input, all parts joined.
    pub fn user_input(&self) -> String {
        self.message.joined_text()
    }
}

/// One agent's behavior, driven by the request handler.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Handle one request, emitting progress and results through `queue`.
    ///
    /// Failures are reported as events; the handler never sees them as
    /// errors, so a run is always resolved one way or the other.
    async fn execute(&self, context: &RequestContext, queue: &EventQueue);

    /// Acknowledge a cancellation request.
    async fn cancel(&self, context: &RequestContext, queue: &EventQueue);
}
