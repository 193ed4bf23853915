//! # Database Operations
//!
//! Pool construction, schema migrations and health checks for the subscription table.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use subscribe_core::config::ConfigManager;
//! use subscribe_core::database::DatabaseConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load()?;
//! let db = DatabaseConnection::connect(&config).await?;
//! db.migrate().await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```

pub mod connection;

pub use connection::DatabaseConnection;

/// Migrator over the crate's `migrations/` directory
///
/// Use this in tests with: `#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
