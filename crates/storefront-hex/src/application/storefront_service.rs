use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::errors::AppError;
use storefront_types::domain::cart::{Cart, CartAction, LineItem};
use storefront_types::domain::checkout::CheckoutFlow;
use storefront_types::domain::message::{DEFAULT_STORE_NAME, SUPPORT_PHONE_E164};
use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::messaging::Messenger;
use storefront_types::ports::order_ledger::OrderLedger;

/// Where and how order messages are addressed.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub store_name: String,
    pub support_phone: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.into(),
            support_phone: SUPPORT_PHONE_E164.into(),
        }
    }
}

/// One browsing session: the cart and the checkout form state.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) cart: Cart,
    pub(crate) checkout: CheckoutFlow,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub total_paise: i64,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_paise: cart.total_paise(),
            item_count: cart.item_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: String,
    pub message: String,
}

/// Owns the session's cart and its order ledger. The session lock is held for
/// the whole of each operation, so operations never interleave.
pub struct StorefrontService<L: OrderLedger, M: Messenger> {
    pub(crate) session: Mutex<Session>,
    pub(crate) ledger: L,
    pub(crate) messenger: M,
    pub(crate) messaging: MessagingConfig,
}

impl<L: OrderLedger, M: Messenger> StorefrontService<L, M> {
    pub fn new(ledger: L, messenger: M) -> Self {
        Self::with_messaging(ledger, messenger, MessagingConfig::default())
    }

    pub fn with_messaging(ledger: L, messenger: M, messaging: MessagingConfig) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            ledger,
            messenger,
            messaging,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub async fn cart(&self) -> CartView {
        CartView::from(&self.session.lock().await.cart)
    }

    async fn reduce(&self, action: CartAction) -> CartView {
        let mut session = self.session.lock().await;
        session.cart = std::mem::take(&mut session.cart).apply(action);
        CartView::from(&session.cart)
    }

    pub async fn add_to_cart(&self, item: LineItem) -> CartView {
        tracing::debug!(id = %item.id, quantity = item.quantity, "add to cart");
        self.reduce(CartAction::Add(item)).await
    }

    pub async fn update_quantity(&self, id: &str, quantity: i64) -> CartView {
        self.reduce(CartAction::UpdateQuantity {
            id: id.to_string(),
            quantity,
        })
        .await
    }

    pub async fn remove_from_cart(&self, id: &str) -> CartView {
        self.reduce(CartAction::Remove { id: id.to_string() }).await
    }

    /// Snapshots the cart into the ledger, then empties the cart. An empty
    /// cart is refused with a notice and nothing changes.
    pub async fn place_order(&self) -> Result<PlacedOrder, AppError> {
        let mut session = self.session.lock().await;
        self.commit_order(&mut session).await
    }

    /// Runs with the session lock held. The cart is cleared only once the
    /// ledger has accepted the snapshot.
    pub(crate) async fn commit_order(&self, session: &mut Session) -> Result<PlacedOrder, AppError> {
        let order = Order::snapshot(&session.cart, Utc::now())?;
        let order = self.ledger.append(order).await?;
        session.cart = std::mem::take(&mut session.cart).clear();

        tracing::info!(
            order_id = %order.id(),
            total_paise = order.total_paise(),
            lines = order.items().len(),
            "order placed"
        );
        Ok(PlacedOrder {
            order_id: order.id().to_string(),
            message: format!("Order {} placed successfully.", order.id()),
        })
    }

    pub async fn orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.ledger.list().await?)
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, AppError> {
        match self.ledger.get(id).await? {
            Some(o) => Ok(o),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }

    /// Fulfillment hook: moves an order's status forward.
    pub async fn advance_order_status(&self, id: &str, status: OrderStatus) -> Result<Order, AppError> {
        match self.ledger.advance_status(id, status).await? {
            Some(o) => {
                tracing::info!(order_id = %id, ?status, "order status advanced");
                Ok(o)
            }
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }
}
