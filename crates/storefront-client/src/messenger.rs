use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use storefront_types::domain::message::OutboundMessage;
use storefront_types::ports::messaging::Messenger;

/// Hands orders to WhatsApp via a `wa.me` deep link. The link is logged and
/// kept in a short outbox; opening it is up to the shopper's browser.
#[derive(Clone, Default)]
pub struct WhatsAppMessenger {
    outbox: Arc<Mutex<VecDeque<String>>>,
}

const OUTBOX_LIMIT: usize = 32;

impl WhatsAppMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep links dispatched so far, oldest first.
    pub fn sent_links(&self) -> Vec<String> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Messenger for WhatsAppMessenger {
    fn dispatch(&self, message: &OutboundMessage) {
        let link = message.deep_link();
        tracing::info!(destination = %message.destination, %link, "order message handed to WhatsApp");
        let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
        if outbox.len() == OUTBOX_LIMIT {
            outbox.pop_front();
        }
        outbox.push_back(link);
    }
}
