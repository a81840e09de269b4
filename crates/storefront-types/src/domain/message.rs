use serde::{Deserialize, Serialize};

use crate::domain::cart::LineItem;
use crate::domain::checkout::CheckoutDetails;

pub const DEFAULT_STORE_NAME: &str = "ModiQ";
pub const SUPPORT_PHONE_E164: &str = "+918669933603";
pub const WHATSAPP_BASE: &str = "https://wa.me/";

/// Builds the order enquiry text: a header with the delivery details followed
/// by one numbered line per cart item, in cart order.
pub fn compose_order_message(store_name: &str, details: &CheckoutDetails, items: &[LineItem]) -> String {
    let mut lines = vec![
        format!("Hi {store_name},"),
        "New order enquiry from the website:".to_string(),
        format!("Name: {}", details.customer_name),
        format!("Contact: {}", details.contact_number),
        format!("Delivery: {}", details.delivery_address),
        String::new(),
        "Items:".to_string(),
    ];

    if items.is_empty() {
        lines.push("(cart was empty)".to_string());
    }
    for (index, item) in items.iter().enumerate() {
        lines.push(format!(
            "{}. {} • {} × {}",
            index + 1,
            category_label(item),
            item.name,
            item.quantity
        ));
    }

    lines.join("\n")
}

fn category_label(item: &LineItem) -> &str {
    match item.category_label.as_deref() {
        Some(label) => label,
        None => item.id.split('-').next().unwrap_or("Category"),
    }
}

/// Text addressed to a phone number on the messaging channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(destination: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            text: text.into(),
        }
    }

    /// `https://wa.me/<digits>?text=<encoded text>`
    pub fn deep_link(&self) -> String {
        let digits: String = self.destination.chars().filter(char::is_ascii_digit).collect();
        format!("{WHATSAPP_BASE}{digits}?text={}", urlencoding::encode(&self.text))
    }
}
