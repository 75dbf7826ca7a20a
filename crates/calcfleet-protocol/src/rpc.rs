use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;
use crate::task::Task;

pub const JSONRPC_VERSION: &str = "2.0";
pub const MESSAGE_SEND_METHOD: &str = "message/send";
pub const TASK_CANCEL_METHOD: &str = "tasks/cancel";

/// Parameters of a `message/send` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSendParams {
    pub message: Message,
}

/// Parameters of calls that address a task by id (`tasks/cancel`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
}

/// JSON-RPC request envelope for `message/send`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: MessageSendParams,
}

impl SendMessageRequest {
    pub fn new(message: Message) -> Self {
        SendMessageRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            method: MESSAGE_SEND_METHOD.to_string(),
            params: MessageSendParams { message },
        }
    }
}

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// The payload of a successful `message/send`: either a tracked task or a
/// single terminal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendMessageResponse {
    Success {
        jsonrpc: String,
        id: String,
        result: SendMessageResult,
    },
    Error {
        jsonrpc: String,
        id: String,
        error: JsonRpcError,
    },
}

impl SendMessageResponse {
    pub fn success(id: String, result: SendMessageResult) -> Self {
        SendMessageResponse::Success {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }

    pub fn error(id: String, code: i64, message: impl Into<String>) -> Self {
        SendMessageResponse::Error {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcError {
                code,
                message: message.into(),
            },
        }
    }
}
