use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::database::store::StoreError;

/// Centralized connection pool manager for the campaign database
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared campaign database pool
    pub async fn pool() -> Result<PgPool, StoreError> {
        Self::instance().get_pool().await
    }

    /// Get existing pool or create it lazily
    async fn get_pool(&self) -> Result<PgPool, StoreError> {
        // Fast path: try read lock
        {
            let pool = self.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let connection_string = Self::build_connection_string()?;
        let config = crate::config::config();

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database.connection_timeout,
            ))
            .connect(&connection_string)
            .await?;

        {
            let mut slot = self.pool.write().await;
            *slot = Some(pool.clone());
        }

        info!("Created campaign database pool");
        Ok(pool)
    }

    /// Build the connection string from DATABASE_URL, optionally
    /// swapping the database name from CAMPAIGN_DB
    fn build_connection_string() -> Result<String, StoreError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        match std::env::var("CAMPAIGN_DB") {
            Ok(database_name) if !database_name.is_empty() => {
                let mut url =
                    url::Url::parse(&base).map_err(|_| StoreError::InvalidDatabaseUrl)?;
                url.set_path(&format!("/{}", database_name));
                Ok(url.into())
            }
            _ => Ok(base),
        }
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed campaign database pool");
        }
    }
}
