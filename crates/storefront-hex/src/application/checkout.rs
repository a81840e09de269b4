//! Checkout orchestration over the storefront session: opens the details
//! form, composes the order message, hands it to the messaging agent and
//! commits the order.

use serde::Serialize;

use crate::application::storefront_service::StorefrontService;
use crate::errors::AppError;
use storefront_types::domain::checkout::{CheckoutDetails, CheckoutError, CheckoutPhase};
use storefront_types::domain::message::{compose_order_message, OutboundMessage};
use storefront_types::ports::messaging::Messenger;
use storefront_types::ports::order_ledger::OrderLedger;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub message: String,
    pub deep_link: String,
    /// Phase the submission reached; the form is back to `Idle` afterwards.
    pub phase: CheckoutPhase,
}

impl<L: OrderLedger, M: Messenger> StorefrontService<L, M> {
    pub async fn checkout_phase(&self) -> CheckoutPhase {
        self.session.lock().await.checkout.phase()
    }

    pub async fn start_checkout(&self) -> Result<CheckoutPhase, AppError> {
        let mut session = self.session.lock().await;
        let session = &mut *session;
        let phase = session.checkout.start(&session.cart)?;
        tracing::debug!(?phase, "checkout started");
        Ok(phase)
    }

    /// Closes an open details form without side effects.
    pub async fn cancel_checkout(&self) -> CheckoutPhase {
        let mut session = self.session.lock().await;
        if session.checkout.cancel() {
            tracing::debug!("checkout cancelled");
        }
        session.checkout.phase()
    }

    /// Submits delivery details. Incomplete details keep the form open. If
    /// the cart emptied while the form was open the attempt is dropped before
    /// anything is sent or recorded.
    pub async fn submit_checkout(&self, details: CheckoutDetails) -> Result<CheckoutReceipt, AppError> {
        let mut session = self.session.lock().await;
        let details = session.checkout.submit(&details)?;

        if session.cart.is_empty() {
            session.checkout.abort();
            tracing::warn!("cart emptied during checkout, submission dropped");
            return Err(CheckoutError::EmptyCart.into());
        }

        let text = compose_order_message(&self.messaging.store_name, &details, session.cart.items());
        let outbound = OutboundMessage::new(self.messaging.support_phone.clone(), text);
        self.messenger.dispatch(&outbound);

        let placed = match self.commit_order(&mut session).await {
            Ok(placed) => placed,
            Err(e) => {
                session.checkout.abort();
                return Err(e);
            }
        };
        let phase = session.checkout.complete();

        Ok(CheckoutReceipt {
            order_id: placed.order_id,
            message: placed.message,
            deep_link: outbound.deep_link(),
            phase,
        })
    }
}
