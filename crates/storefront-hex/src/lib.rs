//! storefront-hex: storefront core (cart, order ledger, checkout, admin
//! catalog editor) plus the inbound HTTP adapter.

pub mod config;
pub mod errors;
pub mod identity;

pub mod application;

pub use storefront_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
