pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod message;
pub mod order;
pub mod validation;
