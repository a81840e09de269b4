pub mod catalog_store;
pub mod identity;
pub mod messaging;
pub mod order_ledger;
