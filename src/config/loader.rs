//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `<config_dir>/subscribe.toml`
//! 3. `<config_dir>/subscribe.<environment>.toml`
//! 4. `SUBSCRIBE__<SECTION>__<KEY>` environment variables
//!
//! Both files are optional.

use super::error::{ConfigResult, ConfigurationError};
use super::SubscribeConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const ENV_PREFIX: &str = "SUBSCRIBE";
const BASE_FILE: &str = "subscribe";
const PROVIDERS_ENABLED_KEY: &str = "providers.enabled";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: SubscribeConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = %environment,
            database_host = %config.database.host,
            max_connections = config.database.max_connections,
            providers = config.providers.enabled.len(),
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: SubscribeConfig, environment: &str) -> ConfigResult<ConfigManager> {
        config.validate()?;
        Ok(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: Self::default_config_directory(),
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SubscribeConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Connection URL for the loaded environment
    pub fn database_url(&self) -> String {
        self.config.database.database_url(&self.environment)
    }

    /// Configuration as JSON with credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Current environment from `SUBSCRIBE_ENV`, then `APP_ENV`, else development
    pub fn detect_environment() -> String {
        env::var("SUBSCRIBE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("SUBSCRIBE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// `SUBSCRIBE__SECTION__KEY` variables; list settings take comma-separated values
    fn environment_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key(PROVIDERS_ENABLED_KEY)
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<SubscribeConfig> {
        Self::merge_sources(config_directory, environment, Self::environment_source())
    }

    fn merge_sources(
        config_directory: &Path,
        environment: &str,
        variables: Environment,
    ) -> ConfigResult<SubscribeConfig> {
        let base = config_directory.join(format!("{BASE_FILE}.toml"));
        let overrides = config_directory.join(format!("{BASE_FILE}.{environment}.toml"));

        let settings = Config::builder()
            .add_source(File::from(base).required(false))
            .add_source(File::from(overrides).required(false))
            .add_source(variables)
            .build()
            .map_err(|e| ConfigurationError::load_error(environment, e))?;

        settings
            .try_deserialize::<SubscribeConfig>()
            .map_err(ConfigurationError::deserialize_error)
    }

    fn sanitize_config_for_logging(config: &SubscribeConfig) -> serde_json::Value {
        let mut value = serde_json::to_value(config).unwrap_or(serde_json::Value::Null);
        if let Some(database) = value.get_mut("database").and_then(|d| d.as_object_mut()) {
            database.insert("password".to_string(), serde_json::json!("***"));
            if database.get("url").is_some_and(|u| !u.is_null()) {
                database.insert("url".to_string(), serde_json::json!("***"));
            }
        }
        value
    }
}
