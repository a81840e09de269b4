use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::order_ledger::{LedgerError, OrderLedger};

/// Session-scoped ledger. Each order carries its append sequence so listing
/// can restore most-recent-first order.
#[derive(Clone)]
pub struct InMemoryLedger {
    pub map: Arc<DashMap<String, (u64, Order)>>,
    seq: Arc<AtomicU64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderLedger for InMemoryLedger {
    async fn append(&self, order: Order) -> Result<Order, LedgerError> {
        match self.map.entry(order.id().to_string()) {
            Entry::Occupied(_) => Err(LedgerError::Duplicate(order.id().to_string())),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::SeqCst);
                slot.insert((seq, order.clone()));
                Ok(order)
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, LedgerError> {
        Ok(self.map.get(id).map(|r| r.value().1.clone()))
    }

    async fn list(&self) -> Result<Vec<Order>, LedgerError> {
        let mut rows: Vec<(u64, Order)> = self.map.iter().map(|kv| kv.value().clone()).collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(rows.into_iter().map(|(_, order)| order).collect())
    }

    async fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.map.len())
    }

    async fn advance_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, LedgerError> {
        if let Some(mut v) = self.map.get_mut(id) {
            v.1.advance_status(status)?;
            return Ok(Some(v.1.clone()));
        }
        Ok(None)
    }
}
