use crate::domain::message::OutboundMessage;

/// Hands a composed message to the external messaging agent. Delivery is not
/// observable: there is no result and no acknowledgement.
pub trait Messenger: Send + Sync + 'static {
    fn dispatch(&self, message: &OutboundMessage);
}
