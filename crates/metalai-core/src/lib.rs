pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatService, ChatbotClient};
pub use config::Config;
pub use db::{DatabaseConfig, DocumentStore};
pub use error::{ChatError, ConfigError, DbError};
pub use state::{ChatMessage, ChatWidget, Sender, WidgetState, FALLBACK_REPLY};
