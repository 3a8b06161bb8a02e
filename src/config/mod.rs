//! Configuration management module.
//!
//! Supports loading configuration from:
//! - A `.env` file in the working directory
//! - TOML files (config/default.toml, config/{profile}.toml)
//! - Environment variables with `EXERCISE_TRACKER__<SECTION>__<KEY>` pattern
//! - The plain `MONGO_URI` and `PORT` variables used by hosted deployments

mod assets;
mod server;
mod storage;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use assets::AssetsConfig;
pub use server::ServerConfig;
pub use storage::{DEFAULT_DATABASE, MongoStorageConfig, StorageBackend, StorageConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Static asset configuration.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. `.env` (exported into the process environment, never overriding existing variables)
    /// 2. `config/default.toml`
    /// 3. `config/{EXERCISE_TRACKER_PROFILE}.toml` (defaults to `development`)
    /// 4. Environment variables with `EXERCISE_TRACKER__` prefix
    /// 5. `MONGO_URI` and `PORT`
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case outside local development
        let _ = dotenvy::dotenv();

        let profile =
            std::env::var("EXERCISE_TRACKER_PROFILE").unwrap_or_else(|_| "development".to_string());

        let mongo_uri = non_empty_env("MONGO_URI");
        let port = non_empty_env("PORT");

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            // EXERCISE_TRACKER__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::with_prefix("EXERCISE_TRACKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "storage.backend",
                mongo_uri.as_ref().map(|_| StorageBackend::MongoDB.to_string()),
            )?
            .set_override_option("storage.mongodb.uri", mongo_uri)?
            .set_override_option("server.port", port)?
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port cannot be 0".to_string()));
        }

        self.storage.validate()?;

        if self.observability.log_format != "text" && self.observability.log_format != "json" {
            return Err(ConfigError::Message(format!(
                "observability.log_format must be \"text\" or \"json\", got {:?}",
                self.observability.log_format
            )));
        }

        if self.observability.metrics_enabled && !self.observability.metrics_path.starts_with('/') {
            return Err(ConfigError::Message(
                "observability.metrics_path must start with '/'".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Metrics endpoint path.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: true,
            metrics_path: default_metrics_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.mongodb.database, None);
        assert_eq!(config.observability.metrics_path, "/metrics");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = AppConfig::default();
        config.observability.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 8080\n\n[storage]\nbackend = \"mongodb\"\n\n[storage.mongodb]\nuri = \"mongodb://db:27017\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::MongoDB);
        assert_eq!(config.storage.mongodb.uri, "mongodb://db:27017");
        assert_eq!(config.storage.mongodb.database, None);
        assert_eq!(config.assets.index_file.to_str(), Some("views/index.html"));
    }
}
