use async_trait::async_trait;

use crate::domain::order::{Order, OrderError, OrderStatus};

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("order {0} already recorded")]
    Duplicate(String),

    #[error(transparent)]
    Rejected(#[from] OrderError),
}

/// Append-only history of placed orders, read back most recent first.
#[async_trait]
pub trait OrderLedger: Send + Sync + 'static {
    async fn append(&self, order: Order) -> Result<Order, LedgerError>;
    async fn get(&self, id: &str) -> Result<Option<Order>, LedgerError>;
    async fn list(&self) -> Result<Vec<Order>, LedgerError>;
    async fn len(&self) -> Result<usize, LedgerError>;

    /// Moves an order's status forward on behalf of fulfillment. Nothing else
    /// about a recorded order can change.
    async fn advance_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, LedgerError>;
}
