use crate::config::AppConfig;
use crate::service::ServiceRegistry;
use crate::storage::StorageManager;

/// Everything a handler needs, passed explicitly to every event.
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageManager,
    pub service_registry: ServiceRegistry,
    pub support_username: String,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Self {
        let storage = StorageManager::connect(&config.storage).await;

        let service_registry = ServiceRegistry::new(config, storage.clone());

        Self {
            storage,
            service_registry,
            support_username: config.support.username.clone(),
        }
    }
}
