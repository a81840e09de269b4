pub mod catalog_editor;
pub mod checkout;
pub mod storefront_service;
