mod model;

pub use model::{Level, ProfilePatch, UserProfile};

use chrono::Utc;
use std::sync::Arc;
use teloxide::types::UserId;

use crate::storage::{StorageError, StorageManager};

use super::auth::Authorizer;

/// Owns `user:<id>` records.
///
/// `merge` is a plain read-modify-write over the store: two concurrent merges for the
/// same user can lose one update. Events for one user are handled one at a time, which
/// keeps this out of reach in practice.
#[derive(Clone)]
pub struct ProfileService {
    storage: StorageManager,
    authorizer: Arc<dyn Authorizer>,
}

impl ProfileService {
    pub fn new(storage: StorageManager, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { storage, authorizer }
    }

    pub async fn get_or_create(&self, user_id: UserId) -> Result<UserProfile, StorageError> {
        let id = user_id.to_string();

        let mut profile = match self.storage.get_record::<UserProfile>(&id).await? {
            Some(profile) => profile,
            None => {
                let profile = UserProfile::new(Utc::now());
                self.storage.set_record(&id, &profile).await?;
                profile
            }
        };

        profile.role = self.authorizer.role_of(user_id);
        Ok(profile)
    }

    pub async fn merge(&self, user_id: UserId, patch: ProfilePatch) -> Result<UserProfile, StorageError> {
        let mut profile = self.get_or_create(user_id).await?;
        profile.merge(patch, Utc::now());

        self.storage.set_record(&user_id.to_string(), &profile).await?;
        Ok(profile)
    }

    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.storage.record_ids::<UserProfile>().await?.len())
    }

    /// Up to `limit` stored profiles with their ids, in store enumeration order.
    pub async fn list_all(&self, limit: usize) -> Result<Vec<(String, UserProfile)>, StorageError> {
        let mut users = Vec::new();

        for id in self.storage.record_ids::<UserProfile>().await? {
            if users.len() >= limit {
                break;
            }
            // expired between scan and read
            if let Some(profile) = self.storage.get_record::<UserProfile>(&id).await? {
                users.push((id, profile));
            }
        }

        Ok(users)
    }
}
