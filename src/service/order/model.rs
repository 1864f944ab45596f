use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::storage::Keyed;

const ORDER_TTL: Duration = Duration::from_secs(86400 * 7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
    PaymentError,
}

impl OrderStatus {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "order.status.pending",
            OrderStatus::Paid => "order.status.paid",
            OrderStatus::Completed => "order.status.completed",
            OrderStatus::Cancelled => "order.status.cancelled",
            OrderStatus::PaymentError => "order.status.payment_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    pub telegram_username: String,
    pub stars_amount: u32,
    pub price: u32,
    pub points: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Keyed for Order {
    fn key_prefix() -> &'static str {
        "order"
    }

    fn ttl() -> Option<Duration> {
        Some(ORDER_TTL)
    }
}

/// Buyer-supplied part of an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: u64,
    pub username: String,
    pub first_name: String,
    pub telegram_username: String,
    pub stars_amount: u32,
    pub price: u32,
    pub points: u32,
}

impl NewOrder {
    pub(super) fn into_order(self, order_id: String, created_at: DateTime<Utc>) -> Order {
        Order {
            order_id,
            user_id: self.user_id,
            username: self.username,
            first_name: self.first_name,
            telegram_username: self.telegram_username,
            stars_amount: self.stars_amount,
            price: self.price,
            points: self.points,
            status: OrderStatus::Pending,
            created_at,
        }
    }
}
