//! HTTP client for the arithmetic toolkit backend.

use serde::Deserialize;

use calcfleet_types::{format_decimal, parse_decimal, Decimal, Operation, RemoteError};

#[derive(Deserialize)]
struct ToolCallReply {
    result: String,
}

#[derive(Deserialize)]
struct ToolErrorReply {
    error: String,
}

#[derive(Deserialize)]
struct ToolListReply {
    tools: Vec<String>,
}

/// Client for the toolkit's `/tools` endpoints.
pub struct ToolClient {
    base_url: String,
    http: reqwest::Client,
}

impl ToolClient {
    pub fn new(base_url: &str) -> Self {
        ToolClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// List the operation names the backend exposes.
    pub async fn list_tools(&self) -> Result<Vec<String>, RemoteError> {
        let url = format!("{}/tools", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(RemoteError::Transport(format!(
                "tool listing returned {}",
                response.status()
            )));
        }
        let reply: ToolListReply = response
            .json()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(reply.tools)
    }

    /// Invoke one fold operation over two or more operands.
    pub async fn call(
        &self,
        operation: Operation,
        operands: &[Decimal],
    ) -> Result<Decimal, RemoteError> {
        let url = format!("{}/tools/call", self.base_url);
        let payload = serde_json::json!({
            "operation": operation.name(),
            "operands": operands.iter().map(|v| format_decimal(*v)).collect::<Vec<_>>(),
        });
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let reply: ToolErrorReply = response
                .json()
                .await
                .map_err(|err| RemoteError::Transport(err.to_string()))?;
            return Err(RemoteError::Protocol(reply.error));
        }

        let reply: ToolCallReply = response
            .json()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        parse_decimal(&reply.result)
            .map_err(|_| RemoteError::NoNumericResult(reply.result.clone()))
    }
}
