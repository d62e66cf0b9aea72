//! Document store bootstrap
//!
//! One MongoDB connection is opened at startup and shared for the life of the
//! process. Unlike a fire-and-forget connect, the outcome is always handed
//! back so the caller decides whether to continue.

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::DbError;

const APP_NAME: &str = "metalai";

static SHARED: OnceCell<DocumentStore> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    /// Used when the connection string does not name a database
    pub database: Option<String>,
}

/// Handle to the connected document store
#[derive(Debug, Clone)]
pub struct DocumentStore {
    client: Client,
    database: Database,
}

impl DocumentStore {
    /// Connect and verify the server answers. Logs the outcome either way.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let result = Self::open(config).await;
        match &result {
            Ok(store) => info!(database = store.database.name(), "document store connected"),
            Err(e) => error!(error = %e, "document store connection failed"),
        }
        result
    }

    async fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(DbError::Options)?;
        options.app_name = Some(APP_NAME.to_string());

        let name = database_name(&options, config)?;
        let client = Client::with_options(options).map_err(DbError::Options)?;
        let database = client.database(&name);

        let store = Self { client, database };
        store.ping().await?;
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(DbError::Connect)?;
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }
}

/// Connect once per process. Later calls return the first handle without
/// reconnecting; a failed attempt leaves the cell empty.
pub async fn connect_shared(config: &DatabaseConfig) -> Result<&'static DocumentStore, DbError> {
    SHARED.get_or_try_init(|| DocumentStore::connect(config)).await
}

pub fn shared() -> Option<&'static DocumentStore> {
    SHARED.get()
}

fn database_name(options: &ClientOptions, config: &DatabaseConfig) -> Result<String, DbError> {
    options
        .default_database
        .clone()
        .or_else(|| config.database.clone())
        .filter(|name| !name.is_empty())
        .ok_or(DbError::MissingDatabase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(uri: &str, database: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            uri: uri.to_string(),
            database: database.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_database_name_from_uri_wins() {
        let cfg = config("mongodb://localhost:27017/Metalystics", Some("Other"));
        let options = ClientOptions::parse(cfg.uri.as_str()).await.unwrap();
        assert_eq!(database_name(&options, &cfg).unwrap(), "Metalystics");
    }

    #[tokio::test]
    async fn test_database_name_falls_back_to_config() {
        let cfg = config("mongodb://localhost:27017", Some("Metalystics"));
        let options = ClientOptions::parse(cfg.uri.as_str()).await.unwrap();
        assert_eq!(database_name(&options, &cfg).unwrap(), "Metalystics");
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_uri() {
        let err = DocumentStore::connect(&config("not-a-connection-string", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Options(_)));
    }

    #[tokio::test]
    async fn test_connect_requires_database_name() {
        let err = DocumentStore::connect(&config("mongodb://localhost:27017", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MissingDatabase));
    }

    #[tokio::test]
    async fn test_failed_shared_connect_leaves_cell_empty() {
        assert!(connect_shared(&config("bogus://", None)).await.is_err());
        assert!(shared().is_none());
    }
}
