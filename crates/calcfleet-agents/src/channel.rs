//! Shared request channel to a remote agent.

use tokio::sync::Mutex;

use calcfleet_protocol::{
    AgentCard, Message, Role, SendMessageRequest, SendMessageResponse, SendMessageResult,
    AGENT_CARD_PATH,
};
use calcfleet_types::{extract_last_decimal, Decimal, RemoteError};

/// One session to a fixed agent address.
///
/// The agent card is resolved lazily on first use and reused afterwards;
/// the card lock is held across each call so at most one request is in
/// flight per channel.
pub struct AgentChannel {
    base_url: String,
    http: reqwest::Client,
    card: Mutex<Option<AgentCard>>,
}

impl AgentChannel {
    pub fn new(base_url: &str) -> Self {
        AgentChannel {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            card: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one text message and return the raw result payload.
    pub async fn send_text(&self, text: &str) -> Result<SendMessageResult, RemoteError> {
        let mut card = self.card.lock().await;
        if card.is_none() {
            *card = Some(self.fetch_card().await?);
        }
        let endpoint = card
            .as_ref()
            .map(|card| card.url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.base_url.clone());

        let request = SendMessageRequest::new(Message::user_text(text));
        let response = self
            .http
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let response: SendMessageResponse = response
            .json()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        match response {
            SendMessageResponse::Success { result, .. } => Ok(result),
            SendMessageResponse::Error { error, .. } => Err(RemoteError::Protocol(error.message)),
        }
    }

    async fn fetch_card(&self) -> Result<AgentCard, RemoteError> {
        let url = format!("{}{}", self.base_url, AGENT_CARD_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(RemoteError::Transport(format!(
                "agent card request to {url} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))
    }

    /// Pick the most recent agent-authored text out of a result payload.
    ///
    /// Tasks prefer the last agent entry in history, then the status
    /// message; a bare message result speaks for itself.
    pub fn latest_agent_text(result: &SendMessageResult) -> Result<String, RemoteError> {
        let message = match result {
            SendMessageResult::Task(task) => task
                .history
                .iter()
                .rev()
                .find(|entry| entry.role == Role::Agent)
                .or(task.status.message.as_ref()),
            SendMessageResult::Message(message) => Some(message),
        };
        message
            .map(Message::joined_text)
            .ok_or(RemoteError::MissingMessage)
    }

    /// Extract the decimal a worker reported in its reply.
    pub fn extract_decimal(result: &SendMessageResult) -> Result<Decimal, RemoteError> {
        let text = Self::latest_agent_text(result)?;
        extract_last_decimal(&text).ok_or(RemoteError::NoNumericResult(text))
    }
}
