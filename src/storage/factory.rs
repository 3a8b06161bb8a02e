//! Storage backend factory.
//!
//! Creates the appropriate storage backend based on configuration.

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageResult;
use crate::storage::memory::MemoryStorage;
use crate::storage::mongo::MongoStorage;
use crate::storage::traits::Storage;

/// Create a storage backend based on configuration.
///
/// The backend is verified to be reachable before it is returned, so a
/// successful call means the service can start serving.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be initialized.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::MongoDB => {
            let storage = MongoStorage::connect(&config.mongodb).await?;
            storage.health_check().await.inspect_err(|e| {
                tracing::error!(error = %e, "MongoDB connection error");
            })?;
            storage.initialize_indexes().await?;
            tracing::info!("Connected to MongoDB");
            Arc::new(storage)
        }
    };

    storage.health_check().await?;
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoStorageConfig;

    #[tokio::test]
    async fn test_create_memory_storage() {
        let config = StorageConfig::default();

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_create_mongo_storage_rejects_bad_uri() {
        let config = StorageConfig {
            backend: StorageBackend::MongoDB,
            mongodb: MongoStorageConfig {
                uri: "not-a-mongodb-uri".to_string(),
                ..Default::default()
            },
        };

        let result = create_storage(&config).await;
        assert!(result.is_err());
    }
}
