use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{total_of, Cart, LineItem};

pub const ORDER_ID_PREFIX: &str = "MOD-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderStatus {
    Processing,
    Confirmed,
    Dispatched,
}

impl OrderStatus {
    /// Status only ever moves forward.
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        next > self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("order {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Frozen copy of the cart taken when the order was placed. Only `status`
/// changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    id: String,
    items: Vec<LineItem>,
    total_paise: i64,
    placed_at: DateTime<Utc>,
    status: OrderStatus,
}

impl Order {
    pub fn snapshot(cart: &Cart, placed_at: DateTime<Utc>) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let items = cart.items().to_vec();
        let total_paise = total_of(&items);
        Ok(Self {
            id: generate_order_id(placed_at),
            items,
            total_paise,
            placed_at,
            status: OrderStatus::Processing,
        })
    }

    /// Reassembles an order read back from storage.
    pub fn from_parts(
        id: String,
        items: Vec<LineItem>,
        total_paise: i64,
        placed_at: DateTime<Utc>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            items,
            total_paise,
            placed_at,
            status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_paise(&self) -> i64 {
        self.total_paise
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn advance_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_advance_to(next) {
            return Err(OrderError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// `MOD-<unix millis>-<8 hex>`; the random tail keeps two orders placed in
/// the same millisecond apart.
pub fn generate_order_id(at: DateTime<Utc>) -> String {
    let tail = Uuid::new_v4().simple().to_string();
    format!("{ORDER_ID_PREFIX}{}-{}", at.timestamp_millis(), &tail[..8])
}
