use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;
use storefront_types::domain::catalog::{
    CatalogCategory, CatalogProduct, CategoryForm, ProductForm,
};
use storefront_types::ports::catalog_store::CatalogStore;

/// What the admin console currently shows.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogView {
    pub categories: Vec<CatalogCategory>,
    /// Products per category id, for the categories opened so far.
    pub products: BTreeMap<String, Vec<CatalogProduct>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Saved<T> {
    pub record: T,
    pub notice: &'static str,
}

/// Admin catalog CRUD. Local state changes only after the store has answered,
/// and a failed call leaves it as it was. There is no delete.
pub struct CatalogEditor<C: CatalogStore> {
    store: C,
    view: RwLock<CatalogView>,
}

impl<C: CatalogStore> CatalogEditor<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            view: RwLock::new(CatalogView::default()),
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn view(&self) -> CatalogView {
        self.view.read().await.clone()
    }

    /// Shopper-facing read; does not touch the admin view.
    pub async fn list_categories(&self) -> Result<Vec<CatalogCategory>, AppError> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn list_products(&self, category_id: Option<&str>) -> Result<Vec<CatalogProduct>, AppError> {
        Ok(self.store.list_products(category_id).await?)
    }

    pub async fn load_categories(&self) -> Result<Vec<CatalogCategory>, AppError> {
        let categories = self.store.list_categories().await.map_err(|e| {
            tracing::warn!(error = %e, "loading categories failed");
            e
        })?;
        self.view.write().await.categories = categories.clone();
        Ok(categories)
    }

    pub async fn load_products(&self, category_id: &str) -> Result<Vec<CatalogProduct>, AppError> {
        let products = self.store.list_products(Some(category_id)).await.map_err(|e| {
            tracing::warn!(error = %e, category_id, "loading products failed");
            e
        })?;
        self.view
            .write()
            .await
            .products
            .insert(category_id.to_string(), products.clone());
        Ok(products)
    }

    pub async fn create_category(&self, form: CategoryForm) -> Result<Saved<CatalogCategory>, AppError> {
        let payload = form.into_payload()?;
        let saved = self.store.create_category(&payload).await?;

        let mut view = self.view.write().await;
        view.categories.push(saved.clone());
        view.products.entry(saved.id.clone()).or_default();
        tracing::info!(category_id = %saved.id, "category created");
        Ok(Saved {
            record: saved,
            notice: "Category created successfully.",
        })
    }

    pub async fn update_category(
        &self,
        id: &str,
        form: CategoryForm,
    ) -> Result<Saved<CatalogCategory>, AppError> {
        let payload = form.into_payload()?;
        let saved = self.store.update_category(id, &payload).await?;

        let mut view = self.view.write().await;
        replace_by_id(&mut view.categories, saved.clone(), |c| &c.id);
        view.products.entry(saved.id.clone()).or_default();
        tracing::info!(category_id = %saved.id, "category updated");
        Ok(Saved {
            record: saved,
            notice: "Category updated successfully.",
        })
    }

    pub async fn create_product(
        &self,
        category_id: &str,
        form: ProductForm,
    ) -> Result<Saved<CatalogProduct>, AppError> {
        let payload = form.into_payload(category_id)?;
        let saved = self.store.create_product(&payload).await?;

        let mut view = self.view.write().await;
        view.products
            .entry(payload.category_id.clone())
            .or_default()
            .push(saved.clone());
        tracing::info!(product_id = %saved.id, category_id = %payload.category_id, "product created");
        Ok(Saved {
            record: saved,
            notice: "Product created successfully.",
        })
    }

    pub async fn update_product(
        &self,
        category_id: &str,
        product_id: &str,
        form: ProductForm,
    ) -> Result<Saved<CatalogProduct>, AppError> {
        let payload = form.into_payload(category_id)?;
        let saved = self.store.update_product(product_id, &payload).await?;

        let mut view = self.view.write().await;
        let slot = view.products.entry(payload.category_id.clone()).or_default();
        replace_by_id(slot, saved.clone(), |p| &p.id);
        tracing::info!(product_id = %saved.id, "product updated");
        Ok(Saved {
            record: saved,
            notice: "Product updated successfully.",
        })
    }
}

fn replace_by_id<T>(list: &mut [T], saved: T, id: impl Fn(&T) -> &String) {
    if let Some(existing) = list.iter_mut().find(|entry| id(entry) == id(&saved)) {
        *existing = saved;
    }
}
