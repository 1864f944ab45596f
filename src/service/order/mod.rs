mod model;

pub use model::{NewOrder, Order, OrderStatus};

use chrono::Utc;

use crate::storage::{StorageError, StorageManager};

use super::{security, ServiceError};

pub const PAYMENT_CARD_KEY: &str = "payment_card";
pub const DEFAULT_PAYMENT_CARD: &str = "2202200220202020";

/// `2202200220202020` -> `2202 2002 2020 2020`
pub fn display_card(card: &str) -> String {
    card.chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Owns `order:<id>` records and the `payment_card` setting.
#[derive(Clone)]
pub struct OrderService {
    storage: StorageManager,
}

impl OrderService {
    pub fn new(storage: StorageManager) -> Self {
        Self { storage }
    }

    /// Stamps id, status and creation time, then persists the order.
    ///
    /// Without a record store the id is still returned, but nothing is stored under it.
    pub async fn create(&self, new_order: NewOrder) -> Result<String, StorageError> {
        let order_id = security::generate_order_id();
        let order = new_order.into_order(order_id.clone(), Utc::now());

        if !self.storage.is_available() {
            warn!("Record store unavailable, order {} is not persisted", order_id);
        }

        self.storage.set_record(&order_id, &order).await?;
        info!("Order {} created for user {}", order_id, order.user_id);

        Ok(order_id)
    }

    #[cfg(test)]
    pub async fn get(&self, order_id: &str) -> Result<Option<Order>, StorageError> {
        self.storage.get_record::<Order>(order_id).await
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.storage.record_ids::<Order>().await?.len())
    }

    /// Every stored order, in store enumeration order.
    pub async fn list_all(&self) -> Result<Vec<Order>, StorageError> {
        self.list_recent(usize::MAX).await
    }

    /// Up to `limit` orders in store enumeration order, which is not chronological.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Order>, StorageError> {
        let mut orders = Vec::new();

        for id in self.storage.record_ids::<Order>().await? {
            if orders.len() >= limit {
                break;
            }
            if let Some(order) = self.storage.get_record::<Order>(&id).await? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    pub async fn stored_payment_card(&self) -> Result<Option<String>, StorageError> {
        self.storage.get::<String>(PAYMENT_CARD_KEY).await
    }

    pub async fn get_payment_card(&self) -> Result<String, StorageError> {
        Ok(self
            .stored_payment_card()
            .await?
            .unwrap_or_else(|| DEFAULT_PAYMENT_CARD.to_string()))
    }

    /// Stores the card when it is exactly 16 digits once spaces are removed.
    pub async fn set_payment_card(&self, input: &str) -> Result<String, ServiceError> {
        let card = security::normalize_card_number(input)
            .ok_or_else(|| ServiceError::Validation("card number must be 16 digits".to_string()))?;

        self.storage.set(PAYMENT_CARD_KEY, &card, None).await?;
        Ok(card)
    }
}
