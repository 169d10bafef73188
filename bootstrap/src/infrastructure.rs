//! Shared infrastructure resources
//!
//! Created once at start-up and handed to the service builder behind an `Arc`.

use catalog_adapter_postgres::{PoolStatus, PostgresConfig, check_connection, create_pool};
use catalog_config::AppConfig;
use catalog_errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::retry::{RetryConfig, with_retry};

/// Infrastructure resource container
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
}

impl Infrastructure {
    /// Connect to every backing store, retrying with back-off
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        Self::from_config_with_retry(config, &RetryConfig::default()).await
    }

    pub async fn from_config_with_retry(
        config: AppConfig,
        retry_config: &RetryConfig,
    ) -> AppResult<Self> {
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);

        let postgres_pool = with_retry(retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;

        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        Ok(Self {
            config,
            postgres_pool,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_pool(config: AppConfig, postgres_pool: PgPool) -> Self {
        Self {
            config,
            postgres_pool,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Cloned handle; `PgPool` is reference counted
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    pub fn postgres_pool_status(&self) -> PoolStatus {
        PoolStatus::of(&self.postgres_pool)
    }

    pub async fn check_postgres(&self) -> AppResult<()> {
        check_connection(&self.postgres_pool).await
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.postgres_pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}
