//! Shared application state

use crate::config::{Config, DatabaseConfig, StoreBackend};
use crate::db::{CategoryStore, EntityStore, InMemoryDirectoryStore, PostgresDirectoryStore};
use crate::services::DirectoryService;
use crate::{Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<DirectoryService>,
}

impl AppState {
    /// Connect the configured store backend and wire the search services.
    pub async fn new(config: Config) -> Result<Self> {
        match config.database.backend {
            StoreBackend::Postgres => {
                let pool = connect(&config.database).await?;
                let store = Arc::new(PostgresDirectoryStore::new(pool));
                Ok(Self::with_stores(config, store.clone(), store))
            }
            StoreBackend::Memory => {
                let store = match &config.database.seed_file {
                    Some(path) => InMemoryDirectoryStore::from_file(path)?,
                    None => {
                        tracing::warn!("Memory backend without seed_file; the directory is empty");
                        InMemoryDirectoryStore::default()
                    }
                };
                let store = Arc::new(store);
                Ok(Self::with_stores(config, store.clone(), store))
            }
        }
    }

    pub fn with_stores(
        config: Config,
        entities: Arc<dyn EntityStore>,
        categories: Arc<dyn CategoryStore>,
    ) -> Self {
        let directory = DirectoryService::new(entities, categories, config.search.clone());
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
        }
    }
}

async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| Error::Config("database.url is not set".to_string()))?;
    let statement_timeout_ms = config.statement_timeout_seconds * 1000;

    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                conn.execute(format!("SET statement_timeout = {statement_timeout_ms}").as_str())
                    .await?;
                Ok(())
            })
        })
        .connect(url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("migrations failed: {e}")))?;
        tracing::info!("Database migrations applied");
    }

    tracing::info!(
        min_connections = config.pool_min_size,
        max_connections = config.pool_max_size,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}
