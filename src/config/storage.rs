//! Storage configuration.

use config::ConfigError;
use serde::Deserialize;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process storage (development/tests, lost on restart).
    #[default]
    Memory,
    /// `MongoDB` document store.
    #[serde(rename = "mongodb")]
    MongoDB,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::MongoDB => write!(f, "mongodb"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// `MongoDB` storage configuration.
    #[serde(default)]
    pub mongodb: MongoStorageConfig,
}

impl StorageConfig {
    /// Validate the storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration fields are missing for the selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::MongoDB => {
                if self.mongodb.uri.is_empty() {
                    return Err(ConfigError::Message(
                        "storage.mongodb.uri cannot be empty".to_string(),
                    ));
                }
                if self.mongodb.database.as_deref().is_some_and(str::is_empty) {
                    return Err(ConfigError::Message(
                        "storage.mongodb.database cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// `MongoDB` storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoStorageConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    #[serde(default)]
    pub uri: String,

    /// Database holding the `users` and `exercises` collections.
    ///
    /// When unset, the database named in `uri` is used, then
    /// [`DEFAULT_DATABASE`].
    #[serde(default)]
    pub database: Option<String>,

    /// Server selection / connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Database used when neither the settings nor the connection string name one.
pub const DEFAULT_DATABASE: &str = "exercise_tracker";

impl MongoStorageConfig {
    /// Pick the database: explicit setting, then the one named by the
    /// connection string, then [`DEFAULT_DATABASE`].
    #[must_use]
    pub fn resolve_database<'a>(&'a self, from_uri: Option<&'a str>) -> &'a str {
        self.database
            .as_deref()
            .or(from_uri)
            .unwrap_or(DEFAULT_DATABASE)
    }
}

const fn default_connect_timeout() -> u64 {
    5
}

impl Default for MongoStorageConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: None,
            connect_timeout: default_connect_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_display() {
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
        assert_eq!(StorageBackend::MongoDB.to_string(), "mongodb");
    }

    #[test]
    fn test_storage_config_validation() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());

        let mut config = StorageConfig {
            backend: StorageBackend::MongoDB,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.mongodb.uri = "mongodb://127.0.0.1:27017".to_string();
        assert!(config.validate().is_ok());

        config.mongodb.database = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_database() {
        let mut config = MongoStorageConfig::default();
        assert_eq!(config.resolve_database(None), DEFAULT_DATABASE);
        assert_eq!(config.resolve_database(Some("fcc")), "fcc");

        config.database = Some("tracker_prod".to_string());
        assert_eq!(config.resolve_database(Some("fcc")), "tracker_prod");
    }
}
