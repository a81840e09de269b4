use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use storefront_types::domain::catalog::{
    CatalogCategory, CatalogProduct, CategoryPayload, ProductPayload,
};
use storefront_types::ports::catalog_store::{CatalogError, CatalogStore};

pub mod messenger;

pub use messenger::WhatsAppMessenger;

#[derive(Clone)]
pub struct CatalogClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// HTTP/JSON client for the catalog store (`categories`, `products`).
#[derive(Clone)]
pub struct CatalogClient {
    base: Url,
    client: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<CatalogClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(CatalogClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> Result<Url, CatalogError> {
        self.base
            .join(path)
            .map_err(|e| CatalogError(format!("failed to join url: {e}")))
    }

    /// `<collection>/<id>` with the id escaped as a single path segment.
    fn record_url(&self, collection: &str, id: &str) -> Result<Url, CatalogError> {
        if matches!(id, "" | "." | "..") {
            return Err(CatalogError(format!("invalid record id {id:?}")));
        }
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|_| CatalogError("catalog base url cannot take a path".into()))?
            .push(id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, CatalogError> {
        let res = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "catalog request failed");
            CatalogError(fallback.to_string())
        })?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| fallback.to_string());
            tracing::warn!(%status, %message, "catalog store returned an error");
            return Err(CatalogError(message));
        }

        res.json::<T>().await.map_err(|e| {
            tracing::warn!(error = %e, "catalog response did not decode");
            CatalogError(fallback.to_string())
        })
    }
}

#[async_trait]
impl CatalogStore for CatalogClient {
    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError> {
        let req = self.client.get(self.url("categories")?);
        let body: CategoriesEnvelope = self.send(req, "Unable to load categories").await?;
        Ok(body.categories)
    }

    async fn list_products(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        let mut req = self.client.get(self.url("products")?);
        if let Some(category) = category_id {
            req = req.query(&[("category", category)]);
        }
        let body: ProductsEnvelope = self.send(req, "Unable to load products").await?;
        Ok(body.products)
    }

    async fn create_category(
        &self,
        payload: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError> {
        let req = self.client.post(self.url("categories")?).json(payload);
        let body: CategoryEnvelope = self.send(req, "Unable to save category").await?;
        Ok(body.category)
    }

    async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError> {
        let req = self
            .client
            .put(self.record_url("categories", id)?)
            .json(payload);
        let body: CategoryEnvelope = self.send(req, "Unable to save category").await?;
        Ok(body.category)
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<CatalogProduct, CatalogError> {
        let req = self.client.post(self.url("products")?).json(payload);
        let body: ProductEnvelope = self.send(req, "Unable to save product").await?;
        Ok(body.product)
    }

    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<CatalogProduct, CatalogError> {
        let req = self
            .client
            .put(self.record_url("products", id)?)
            .json(payload);
        let body: ProductEnvelope = self.send(req, "Unable to save product").await?;
        Ok(body.product)
    }
}

impl CatalogClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<CatalogClient> {
        if let Some(client) = self.client {
            return Ok(CatalogClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(CatalogClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct CategoriesEnvelope {
    #[serde(default)]
    categories: Vec<CatalogCategory>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct CategoryEnvelope {
    category: CatalogCategory,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ProductEnvelope {
    product: CatalogProduct,
}
