mod error;
mod memory;
mod redis_store;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{future::Future, sync::Arc, time::Duration};

use crate::config::StorageConfig;

pub const MEMORY_STORE_URL: &str = "memory://";

/// Raw key-value backend. Values are JSON documents.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// A record persisted under `<prefix>:<id>`.
pub trait Keyed: Serialize + DeserializeOwned + Send + Sync {
    fn key_prefix() -> &'static str;
    fn ttl() -> Option<Duration>;

    fn record_key(id: &str) -> String {
        format!("{}:{}", Self::key_prefix(), id)
    }
}

/// Front door to the record store.
///
/// Availability is decided once in [`StorageManager::connect`]. While unavailable
/// every read is absent, every write is a no-op and every scan is empty. A call
/// that exceeds the configured timeout is treated the same way for that call only.
#[derive(Clone)]
pub struct StorageManager {
    backend: Option<Arc<dyn RecordStore>>,
    op_timeout: Duration,
}

impl StorageManager {
    pub async fn connect(config: &StorageConfig) -> Self {
        let op_timeout = Duration::from_secs(config.op_timeout_secs);

        let Some(url) = config.redis_url.as_deref() else {
            warn!("REDIS_URL not set, running without a record store");
            return Self::unavailable();
        };

        if url == MEMORY_STORE_URL {
            info!("Using in-process record store");
            return Self::with_backend(Arc::new(MemoryStore::new()), op_timeout);
        }

        info!("Connecting to Redis...");
        let store = match RedisStore::open(url) {
            Ok(store) => store,
            Err(e) => {
                warn!("Invalid Redis URL, record store disabled: {}", e);
                return Self::unavailable();
            }
        };

        match tokio::time::timeout(op_timeout, store.ping()).await {
            Ok(Ok(())) => {
                info!("Redis connection test successful");
                Self::with_backend(Arc::new(store), op_timeout)
            }
            Ok(Err(e)) => {
                warn!("Redis connection failed, record store disabled: {}", e);
                Self::unavailable()
            }
            Err(_) => {
                warn!("Redis connection timed out, record store disabled");
                Self::unavailable()
            }
        }
    }

    pub fn with_backend(backend: Arc<dyn RecordStore>, op_timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            op_timeout,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            backend: None,
            op_timeout: Duration::ZERO,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        match self.bounded(key, backend.get(key)).await? {
            Some(Some(raw)) => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), StorageError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };

        let serialized = serde_json::to_string(value)?;
        self.bounded(key, backend.set(key, serialized, ttl)).await?;
        Ok(())
    }

    pub async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let Some(backend) = &self.backend else {
            return Ok(Vec::new());
        };

        Ok(self
            .bounded(prefix, backend.keys_with_prefix(prefix))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_record<T: Keyed>(&self, id: &str) -> Result<Option<T>, StorageError> {
        self.get(&T::record_key(id)).await
    }

    pub async fn set_record<T: Keyed>(&self, id: &str, value: &T) -> Result<(), StorageError> {
        self.set(&T::record_key(id), value, T::ttl()).await
    }

    /// Ids of every stored record of type `T`, in store enumeration order.
    pub async fn record_ids<T: Keyed>(&self) -> Result<Vec<String>, StorageError> {
        let prefix = format!("{}:", T::key_prefix());
        let keys = self.scan_prefix(&prefix).await?;

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }

    /// `Ok(None)` when the call timed out.
    async fn bounded<T, F>(&self, key: &str, call: F) -> Result<Option<T>, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.op_timeout, call).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                warn!("Record store call for {} timed out after {:?}", key, self.op_timeout);
                Ok(None)
            }
        }
    }
}
