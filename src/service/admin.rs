use super::{order::OrderService, user::ProfileService};
use crate::storage::StorageError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub users: usize,
    pub orders: usize,
    pub total_stars: u64,
    pub total_revenue: u64,
}

/// Aggregates for the admin panel. Every call walks all `user:*` and `order:*` keys.
#[derive(Clone)]
pub struct AdminService {
    profiles: ProfileService,
    orders: OrderService,
}

impl AdminService {
    pub fn new(profiles: ProfileService, orders: OrderService) -> Self {
        Self { profiles, orders }
    }

    pub async fn stats(&self) -> Result<AdminStats, StorageError> {
        let users = self.profiles.count().await?;
        let orders = self.orders.list_all().await?;

        Ok(AdminStats {
            users,
            orders: orders.len(),
            total_stars: orders.iter().map(|order| u64::from(order.stars_amount)).sum(),
            total_revenue: orders.iter().map(|order| u64::from(order.price)).sum(),
        })
    }
}
