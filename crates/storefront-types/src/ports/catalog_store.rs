use async_trait::async_trait;

use crate::domain::catalog::{CatalogCategory, CatalogProduct, CategoryPayload, ProductPayload};

/// Any failed round-trip to the catalog store. Non-2xx responses, transport
/// failures and undecodable bodies are not told apart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CatalogError(pub String);

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError>;
    async fn list_products(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<CatalogProduct>, CatalogError>;
    async fn create_category(
        &self,
        payload: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError>;
    async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<CatalogProduct, CatalogError>;
    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<CatalogProduct, CatalogError>;
}
