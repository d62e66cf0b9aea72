//! Typed errors for the core library.

use std::path::PathBuf;
use thiserror::Error;

/// Failures in a single request/response exchange with the chatbot service.
///
/// The widget never shows these to the user; every variant collapses into the
/// fallback reply.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chatbot request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chatbot returned status {0}")]
    Status(u16),

    #[error("chatbot reply could not be decoded: {0}")]
    Decode(String),

    /// The task driving the request died before producing a reply
    #[error("chatbot task aborted: {0}")]
    Aborted(String),
}

/// Document store bootstrap failures.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid connection string: {0}")]
    Options(#[source] mongodb::error::Error),

    #[error("could not reach document store: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("no database named in the connection string or configuration")]
    MissingDatabase,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MONGO_URL must be set")]
    MissingMongoUrl,

    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{key} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}
