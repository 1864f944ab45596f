use std::sync::Arc;

use admin::AdminService;
use auth::{Authorizer, StaticAdmins};
use catalog::Catalog;
use conversation::ConversationStore;
use order::OrderService;
use user::ProfileService;

use crate::{config::AppConfig, storage::StorageManager};

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod conversation;
mod error;
pub mod order;
pub mod security;
pub mod user;

pub use error::ServiceError;

#[derive(Clone)]
pub struct ServiceRegistry {
    pub auth: Arc<dyn Authorizer>,
    pub catalog: Arc<Catalog>,
    pub conversation: ConversationStore,
    pub profile: ProfileService,
    pub order: OrderService,
    pub admin: AdminService,
}

impl ServiceRegistry {
    pub fn new(config: &AppConfig, storage: StorageManager) -> Self {
        info!("Initializing service registry");

        let auth: Arc<dyn Authorizer> = Arc::new(StaticAdmins::new([config.admin.telegram_user_id]));

        let registry = Self::with_parts(auth, storage);

        info!("Service registry initialized");
        registry
    }

    pub fn with_parts(auth: Arc<dyn Authorizer>, storage: StorageManager) -> Self {
        let profile = ProfileService::new(storage.clone(), Arc::clone(&auth));
        let order = OrderService::new(storage);
        let admin = AdminService::new(profile.clone(), order.clone());

        Self {
            auth,
            catalog: Arc::new(Catalog::default()),
            conversation: ConversationStore::new(),
            profile,
            order,
            admin,
        }
    }
}
