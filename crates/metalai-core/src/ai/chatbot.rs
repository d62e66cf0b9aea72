use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ChatService;
use crate::error::ChatError;

pub const DEFAULT_CHATBOT_URL: &str = "https://metalyticsai-chatbot.onrender.com";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    reply: String,
}

/// Client for the remote MetalAI chatbot (`POST /chat`)
#[derive(Clone)]
pub struct ChatbotClient {
    client: Client,
    base_url: String,
}

impl ChatbotClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like `new`, but every request gives up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ChatService for ChatbotClient {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let url = self.endpoint();
        debug!(%url, chars = message.chars().count(), "sending chat message");

        // reqwest's .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let reply: ChatReply =
            serde_json::from_slice(&body).map_err(|e| ChatError::Decode(e.to_string()))?;
        Ok(reply.reply)
    }
}
