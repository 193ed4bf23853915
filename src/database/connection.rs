use crate::config::ConfigManager;
use crate::error::{Result, SubscribeError};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

/// Owned PostgreSQL pool built from configuration
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Connect using the loaded configuration's database section
    pub async fn connect(config: &ConfigManager) -> Result<Self> {
        let database = &config.config().database;

        info!(
            "Initializing database pool with {}..{} connections, {}s acquire timeout",
            database.min_connections, database.max_connections, database.acquire_timeout_seconds
        );

        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .min_connections(database.min_connections)
            .acquire_timeout(database.acquire_timeout())
            .connect(&config.database_url())
            .await
            .map_err(|e| SubscribeError::from_sqlx("connect", e))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        super::MIGRATOR.run(&self.pool).await.map_err(|e| {
            SubscribeError::from_sqlx("migrate", sqlx::Error::Migrate(Box::new(e)))
        })?;
        info!("Subscription schema is up to date");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SubscribeError::from_sqlx("health_check", e))?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
