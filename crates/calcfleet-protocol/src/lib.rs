//! Wire types for the calcfleet agent-to-agent protocol
//!
//! A request carries one role-tagged message with text parts and a
//! generated identifier; a success response carries either a terminal
//! message or a task with a status and an ordered history. Transport is
//! JSON-RPC 2.0 over HTTP, agent discovery is a card document served at a
//! well-known path. These are plain serde data types; no transport logic
//! lives here.

pub mod card;
pub mod message;
pub mod rpc;
pub mod task;

pub use card::{AgentCapabilities, AgentCard, AgentSkill, AGENT_CARD_PATH};
pub use message::{Message, Part, Role};
pub use rpc::{
    JsonRpcError, MessageSendParams, SendMessageRequest, SendMessageResponse, SendMessageResult,
    TaskIdParams, JSONRPC_VERSION, MESSAGE_SEND_METHOD, TASK_CANCEL_METHOD,
};
pub use task::{Task, TaskState, TaskStatus, TaskStatusUpdateEvent};
