use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use storefront_types::domain::cart::LineItem;
use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::order_ledger::{LedgerError, OrderLedger};

/// Ledger that outlives the process. Listing order follows the insert
/// sequence, newest first.
pub struct SqliteLedger {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbOrder {
    id: String,
    total_paise: i64,
    status: String,
    placed_at: String,
    items_json: String,
}

fn storage(e: impl ToString) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Processing => "Processing",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Dispatched => "Dispatched",
    }
}

impl DbOrder {
    fn into_order(self) -> Result<Order, LedgerError> {
        let status = match self.status.as_str() {
            "Processing" => OrderStatus::Processing,
            "Confirmed" => OrderStatus::Confirmed,
            "Dispatched" => OrderStatus::Dispatched,
            other => return Err(storage(format!("unknown order status {other}"))),
        };
        let items: Vec<LineItem> = serde_json::from_str(&self.items_json).map_err(storage)?;
        let placed_at = DateTime::parse_from_rfc3339(&self.placed_at)
            .map_err(storage)?
            .with_timezone(&Utc);
        Ok(Order::from_parts(
            self.id,
            items,
            self.total_paise,
            placed_at,
            status,
        ))
    }
}

const SELECT_ORDER: &str = "SELECT id, total_paise, status, placed_at, items_json FROM orders";

impl SqliteLedger {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_orders.sql");
        sqlx::query(ddl).execute(&pool).await?;
        tracing::debug!(database_url, "sqlite order ledger ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl OrderLedger for SqliteLedger {
    async fn append(&self, order: Order) -> Result<Order, LedgerError> {
        let items_json = serde_json::to_string(order.items()).map_err(storage)?;
        let res = sqlx::query(
            "INSERT INTO orders (id, total_paise, status, placed_at, items_json)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.id())
        .bind(order.total_paise())
        .bind(status_to_str(order.status()))
        .bind(order.placed_at().to_rfc3339())
        .bind(items_json)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(order),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(LedgerError::Duplicate(order.id().to_string()))
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, LedgerError> {
        let row: Option<DbOrder> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(DbOrder::into_order).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, LedgerError> {
        let rows: Vec<DbOrder> = sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY seq DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.into_iter()
            .map(DbOrder::into_order)
            .collect::<Result<Vec<_>, _>>()
    }

    async fn len(&self) -> Result<usize, LedgerError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Compare-and-set on the status read: a concurrent writer makes the
    /// update miss, and the step is re-checked against the newer status.
    async fn advance_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, LedgerError> {
        loop {
            let Some(mut order) = self.get(id).await? else {
                return Ok(None);
            };
            let read = order.status();
            order.advance_status(status)?;

            let res = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
                .bind(status_to_str(order.status()))
                .bind(id)
                .bind(status_to_str(read))
                .execute(&self.pool)
                .await
                .map_err(storage)?;
            if res.rows_affected() == 1 {
                return Ok(Some(order));
            }
            tracing::debug!(order_id = id, ?read, "status moved underneath update, re-reading");
        }
    }
}
