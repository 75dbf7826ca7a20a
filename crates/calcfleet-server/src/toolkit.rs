//! The arithmetic toolkit backend.
//!
//! A plain HTTP service exposing the four fold operations over two or more
//! decimal operands. Operator agents never compute locally; they call this
//! backend and report what it observed.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use calcfleet_types::{format_decimal, parse_decimal, Operation};

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    operation: String,
    operands: Vec<String>,
}

/// Build the toolkit router (`GET /tools`, `POST /tools/call`).
pub fn toolkit_router() -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
}

async fn list_tools() -> Json<serde_json::Value> {
    let tools: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
    Json(json!({ "tools": tools }))
}

async fn call_tool(
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let operation = Operation::from_name(&request.operation).ok_or_else(|| {
        bad_request(format!("unknown operation '{}'", request.operation))
    })?;

    let mut operands = Vec::with_capacity(request.operands.len());
    for text in &request.operands {
        let value = parse_decimal(text).map_err(|err| bad_request(err.to_string()))?;
        operands.push(value);
    }

    let result = operation
        .fold(&operands)
        .map_err(|err| bad_request(err.to_string()))?;
    Ok(Json(json!({ "result": format_decimal(result) })))
}

fn bad_request(message: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_tool_folds_left_to_right() {
        let response = call_tool(Json(ToolCallRequest {
            operation: "div".to_string(),
            operands: vec!["20".to_string(), "2".to_string(), "2".to_string()],
        }))
        .await
        .unwrap();
        assert_eq!(response.0["result"], "5");
    }

    #[tokio::test]
    async fn test_division_by_zero_is_a_client_error() {
        let err = call_tool(Json(ToolCallRequest {
            operation: "div".to_string(),
            operands: vec!["1".to_string(), "0".to_string()],
        }))
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1 .0["error"]
            .as_str()
            .unwrap()
            .contains("division by zero"));
    }

    #[tokio::test]
    async fn test_unknown_operations_and_bad_operands_are_rejected() {
        assert!(call_tool(Json(ToolCallRequest {
            operation: "pow".to_string(),
            operands: vec!["2".to_string(), "3".to_string()],
        }))
        .await
        .is_err());

        assert!(call_tool(Json(ToolCallRequest {
            operation: "add".to_string(),
            operands: vec!["two".to_string(), "3".to_string()],
        }))
        .await
        .is_err());

        assert!(call_tool(Json(ToolCallRequest {
            operation: "add".to_string(),
            operands: vec!["2".to_string()],
        }))
        .await
        .is_err());
    }
}
