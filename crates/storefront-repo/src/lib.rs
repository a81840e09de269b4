#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a ledger feature: `memory` or `sqlite`.");

use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::order_ledger::{LedgerError, OrderLedger};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub const DEFAULT_DATABASE_URL: &str = "sqlite://orders.db";

/// The ledger backend selected at startup.
pub enum Ledger {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryLedger),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteLedger),
}

pub async fn build_ledger(url: Option<&str>) -> anyhow::Result<Ledger> {
    Ledger::build(url).await
}

impl Ledger {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build(_: Option<&str>) -> anyhow::Result<Self> {
        tracing::info!("using in-memory order ledger");
        Ok(Self::Memory(memory::InMemoryLedger::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        tracing::info!(url, "using sqlite order ledger");
        Ok(Self::Sqlite(sqlite::SqliteLedger::new(url).await?))
    }

    // Both compiled in: a configured URL opts into durability.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => {
                tracing::info!(url, "using sqlite order ledger");
                Ok(Self::Sqlite(sqlite::SqliteLedger::new(url).await?))
            }
            None => {
                tracing::info!("using in-memory order ledger");
                Ok(Self::Memory(memory::InMemoryLedger::new()))
            }
        }
    }

    fn backend(&self) -> &dyn OrderLedger {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(ledger) => ledger,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(ledger) => ledger,
        }
    }
}

#[async_trait::async_trait]
impl OrderLedger for Ledger {
    async fn append(&self, order: Order) -> Result<Order, LedgerError> {
        self.backend().append(order).await
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, LedgerError> {
        self.backend().get(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, LedgerError> {
        self.backend().list().await
    }

    async fn len(&self) -> Result<usize, LedgerError> {
        self.backend().len().await
    }

    async fn advance_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, LedgerError> {
        self.backend().advance_status(id, status).await
    }
}
