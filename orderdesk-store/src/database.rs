use async_trait::async_trait;
use orderdesk_core::{OrderTransaction, StoreError, StoreResult, TransactionSource};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;
use crate::transaction::PgOrderTransaction;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for DbClient {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        let tx = self.pool.begin().await.map_err(StoreError::backend)?;
        Ok(Box::new(PgOrderTransaction::new(tx)))
    }
}
