//! Expression decomposition: structured planning with a deterministic
//! fallback.
//!
//! The primary path asks an external planning capability for JSON; the
//! reply is untrusted and validated locally. Any structural failure falls
//! back to the left-to-right tokenizer, so a well-formed expression still
//! decomposes when the planner rambles.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use calcfleet_types::{DecompositionError, DecompositionPlan};

use crate::tokenizer::fallback_plan;

/// An opaque planning capability: instruction text in, free text out.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn complete(&self, instruction: &str) -> Result<String>;
}

/// Chat-completions planner speaking the OpenAI-style HTTP API.
pub struct LlmPlanner {
    api_key: String,
    model: String,
    api_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl LlmPlanner {
    pub const DEFAULT_API_URL: &'static str = "https://api.openai.com/v1/chat/completions";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        LlmPlanner {
            api_key: api_key.into(),
            model: model.into(),
            api_url: Self::DEFAULT_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the planner at a different chat-completions endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn complete(&self, instruction: &str) -> Result<String> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": instruction}],
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("planner request failed to send")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("planner API error ({status}): {body}");
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to parse planner API response")?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("planner API response contained no content")
    }
}

/// Build the natural-language planning instruction for an expression.
pub fn planning_instruction(expression: &str) -> String {
    format!(
        "You are an expert math planner. Break down the following arithmetic expression into \
         a sequence of operations that only use addition, subtraction, multiplication, or division. \
         Output JSON matching this schema: {{\n\
         \x20 \"initial_value\": number,\n\
         \x20 \"steps\": [{{\"operation\": \"add\" | \"sub\" | \"mul\" | \"div\", \"operand\": number}}]\n\
         }}.\n\
         Expression: {expression}"
    )
}

/// Decompose an expression into an executable plan.
///
/// Structured planner output is preferred; a malformed reply falls back to
/// deterministic tokenization of the expression itself. When neither path
/// yields a plan the structural failure is reported, carrying the planner
/// reply for diagnosis.
pub async fn decompose(
    planner: &dyn Planner,
    expression: &str,
) -> Result<DecompositionPlan, DecompositionError> {
    let reply = planner
        .complete(&planning_instruction(expression))
        .await
        .map_err(|err| DecompositionError::Planner(err.to_string()))?;

    match serde_json::from_str::<DecompositionPlan>(&reply) {
        Ok(plan) => Ok(plan),
        Err(parse_err) => {
            fallback_plan(expression).map_err(|_| DecompositionError::InvalidReply {
                reason: parse_err.to_string(),
                reply,
            })
        }
    }
}
