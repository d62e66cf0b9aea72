use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::chatbot::DEFAULT_CHATBOT_URL;
use crate::db::DatabaseConfig;
use crate::error::ConfigError;

const DEFAULT_LOG_FILTER: &str = "info";

/// On-disk settings. Every field is optional; environment variables win.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FileConfig {
    pub chatbot_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub mongo_url: Option<String>,
    pub database: Option<String>,
    pub log_filter: Option<String>,
}

impl FileConfig {
    /// Read a config file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub chatbot_url: String,
    pub request_timeout: Option<Duration>,
    pub mongo_url: Option<String>,
    pub database: Option<String>,
    pub log_filter: String,
}

impl Config {
    /// Load from `path` (or the default location) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => match Self::default_path() {
                Some(path) => FileConfig::load(&path)?,
                None => FileConfig::default(),
            },
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with variables from `env`.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let request_timeout_secs = match non_empty("METALAI_REQUEST_TIMEOUT_SECS") {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidTimeout {
                    key: "METALAI_REQUEST_TIMEOUT_SECS",
                    value,
                }
            })?),
            None => file.request_timeout_secs,
        };

        Ok(Self {
            chatbot_url: non_empty("METALAI_CHATBOT_URL")
                .or(file.chatbot_url)
                .unwrap_or_else(|| DEFAULT_CHATBOT_URL.to_string()),
            request_timeout: request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            mongo_url: non_empty("MONGO_URL").or(file.mongo_url),
            database: non_empty("METALAI_DATABASE").or(file.database),
            log_filter: non_empty("RUST_LOG")
                .or(file.log_filter)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Settings for the document store bootstrap. There is no built-in
    /// connection string.
    pub fn database(&self) -> Result<DatabaseConfig, ConfigError> {
        let uri = self.mongo_url.clone().ok_or(ConfigError::MissingMongoUrl)?;
        Ok(DatabaseConfig {
            uri,
            database: self.database.clone(),
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("metalai").join("config.json"))
    }
}
