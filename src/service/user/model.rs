use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{service::auth::Role, storage::Keyed};

const PROFILE_TTL: Duration = Duration::from_secs(86400 * 30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub total_stars: u64,
    #[serde(default)]
    pub total_spent: u64,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub orders_count: u64,
    #[serde(default)]
    pub role: Role,
    pub registration_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Stored by older records, never read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
}

impl UserProfile {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            username: String::new(),
            first_name: String::new(),
            total_stars: 0,
            total_spent: 0,
            points: 0,
            orders_count: 0,
            role: Role::User,
            registration_date: now,
            last_activity: now,
            notifications: None,
        }
    }

    pub fn level(&self) -> Level {
        Level::for_spent(self.total_spent)
    }

    fn apply(&mut self, patch: ProfilePatch) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(total_stars) = patch.total_stars {
            self.total_stars = total_stars;
        }
        if let Some(total_spent) = patch.total_spent {
            self.total_spent = total_spent;
        }
        if let Some(points) = patch.points {
            self.points = points;
        }
        if let Some(orders_count) = patch.orders_count {
            self.orders_count = orders_count;
        }
    }

    pub(super) fn merge(&mut self, patch: ProfilePatch, now: DateTime<Utc>) {
        self.apply(patch);
        self.last_activity = now;
    }
}

impl Keyed for UserProfile {
    fn key_prefix() -> &'static str {
        "user"
    }

    fn ttl() -> Option<Duration> {
        Some(PROFILE_TTL)
    }
}

/// Fields to overwrite on a profile; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub total_stars: Option<u64>,
    pub total_spent: Option<u64>,
    pub points: Option<u64>,
    pub orders_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Level {
    pub fn for_spent(total_spent: u64) -> Self {
        match total_spent {
            5000.. => Level::Platinum,
            2000..=4999 => Level::Gold,
            500..=1999 => Level::Silver,
            _ => Level::Bronze,
        }
    }

    pub fn i18n_key(&self) -> &'static str {
        match self {
            Level::Bronze => "profile.level.bronze",
            Level::Silver => "profile.level.silver",
            Level::Gold => "profile.level.gold",
            Level::Platinum => "profile.level.platinum",
        }
    }
}
