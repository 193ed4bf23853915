//! # Subscription Core Configuration
//!
//! Typed configuration for the database pool, service behaviour and provider
//! registration. Every section has defaults, so an empty source yields a usable
//! development configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use subscribe_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let manager = ConfigManager::load()?;
//!
//! let database_url = manager.config().database.database_url(manager.environment());
//! let unfiltered = manager.config().subscriptions.allow_unfiltered_queries;
//! # let _ = (database_url, unfiltered);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/subscribe.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscribeConfig {
    /// Database connection and pooling configuration
    pub database: DatabaseConfig,

    /// Behaviour of the subscription service
    pub subscriptions: SubscriptionSettings,

    /// Which providers to register at startup
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; `${DATABASE_URL}` defers to the environment variable
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Explicit database name; otherwise derived from the environment
    pub database: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            username: "subscribe".to_string(),
            password: "subscribe".to_string(),
            database: None,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 5,
        }
    }
}

impl DatabaseConfig {
    /// Get database name for the given environment
    pub fn database_name(&self, environment: &str) -> String {
        if let Some(db_name) = &self.database {
            return db_name.clone();
        }

        match environment {
            "test" => "subscribe_test".to_string(),
            "production" => "subscribe_production".to_string(),
            _ => "subscribe_development".to_string(),
        }
    }

    /// Connection URL: explicit `url`, then `DATABASE_URL`, then built from components
    pub fn database_url(&self, environment: &str) -> String {
        if let Some(url) = &self.url {
            if !url.is_empty() && url != "${DATABASE_URL}" {
                return url.clone();
            }
        }

        if let Ok(env_url) = std::env::var("DATABASE_URL") {
            if !env_url.is_empty() {
                return env_url;
            }
        }

        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.database_name(environment)
        )
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    fn has_explicit_url(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| !url.is_empty() && url != "${DATABASE_URL}")
    }
}

/// Service behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriptionSettings {
    /// When false, a filter with no predicates is rejected instead of returning every row
    pub allow_unfiltered_queries: bool,
    /// When true, creating an exact duplicate of an existing subscription fails
    pub reject_duplicates: bool,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            allow_unfiltered_queries: true,
            reject_duplicates: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider names to register, in lookup order; empty registers every candidate
    pub enabled: Vec<String>,
}

impl SubscribeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.database.has_explicit_url() {
            if self.database.host.is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "database.host",
                    "database configuration",
                ));
            }

            if self.database.username.is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "database.username",
                    "database configuration",
                ));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigurationError::invalid_value(
                "database.min_connections",
                self.database.min_connections.to_string(),
                "must not exceed database.max_connections",
            ));
        }

        if self.providers.enabled.iter().any(String::is_empty) {
            return Err(ConfigurationError::invalid_value(
                "providers.enabled",
                "",
                "provider names must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SubscribeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.subscriptions.allow_unfiltered_queries);
        assert!(!config.subscriptions.reject_duplicates);
        assert!(config.providers.enabled.is_empty());
    }

    #[test]
    fn test_database_name_by_environment() {
        let db = DatabaseConfig::default();
        assert_eq!(db.database_name("test"), "subscribe_test");
        assert_eq!(db.database_name("development"), "subscribe_development");

        let named = DatabaseConfig {
            database: Some("custom".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(named.database_name("test"), "custom");
    }

    #[test]
    fn test_explicit_url_wins() {
        let db = DatabaseConfig {
            url: Some("postgresql://a:b@db:6543/subs".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(db.database_url("test"), "postgresql://a:b@db:6543/subs");
    }

    #[test]
    fn test_zero_pool_rejected() {
        let mut config = SubscribeConfig::default();
        config.database.max_connections = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.max_connections"));
    }

    #[test]
    fn test_missing_host_allowed_with_url() {
        let mut config = SubscribeConfig::default();
        config.database.host = String::new();
        assert!(config.validate().is_err());

        config.database.url = Some("postgresql://localhost/subs".to_string());
        assert!(config.validate().is_ok());
    }
}
