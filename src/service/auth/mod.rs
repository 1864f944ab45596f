mod model;

pub use model::Role;

use std::collections::HashSet;
use teloxide::types::UserId;

/// Decides what a user may do. Handlers ask this instead of comparing ids.
pub trait Authorizer: Send + Sync {
    fn role_of(&self, user_id: UserId) -> Role;

    fn is_admin(&self, user_id: UserId) -> bool {
        self.role_of(user_id) == Role::Admin
    }
}

/// Admin identities fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticAdmins {
    admins: HashSet<UserId>,
}

impl StaticAdmins {
    pub fn new(admins: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

impl Authorizer for StaticAdmins {
    fn role_of(&self, user_id: UserId) -> Role {
        if self.admins.contains(&user_id) {
            Role::Admin
        } else {
            Role::User
        }
    }
}
