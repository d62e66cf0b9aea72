pub mod chatbot;

pub use chatbot::ChatbotClient;

use async_trait::async_trait;

use crate::error::ChatError;

/// Something that can answer a chat message.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ChatError>;
}
