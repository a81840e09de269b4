use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use storefront_hex::application::catalog_editor::CatalogEditor;
use storefront_hex::application::storefront_service::StorefrontService;
use storefront_hex::identity::StaticTokenIdentity;
use storefront_hex::inbound::http::{HttpServer, HttpServerConfig};
use storefront_repo::memory::InMemoryLedger;
use storefront_types::domain::catalog::{
    CatalogCategory, CatalogProduct, CategoryPayload, ProductPayload,
};
use storefront_types::domain::message::OutboundMessage;
use storefront_types::ports::catalog_store::{CatalogError, CatalogStore};
use storefront_types::ports::messaging::Messenger;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct Quiet;

impl Messenger for Quiet {
    fn dispatch(&self, _: &OutboundMessage) {}
}

#[derive(Default)]
struct Catalog {
    categories: Mutex<Vec<CatalogCategory>>,
    products: Mutex<Vec<CatalogProduct>>,
}

#[async_trait]
impl CatalogStore for Catalog {
    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn list_products(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .cloned()
            .collect())
    }

    async fn create_category(
        &self,
        payload: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError> {
        let category = CatalogCategory {
            id: payload.name.to_lowercase().replace(' ', "-"),
            name: payload.name.clone(),
            hero_line: payload.hero_line.clone(),
            description: payload.description.clone(),
            image: payload.image.clone(),
            created_at: None,
        };
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: &str,
        _: &CategoryPayload,
    ) -> Result<CatalogCategory, CatalogError> {
        Err(CatalogError(format!("Category {id} not found")))
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<CatalogProduct, CatalogError> {
        let product = CatalogProduct {
            id: format!("{}-{}", payload.category_id, self.products.lock().unwrap().len() + 1),
            category_id: payload.category_id.clone(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            image: payload.image.clone(),
            price: payload.price,
            specs: payload.specs.clone(),
            highlights: payload.highlights.clone(),
            created_at: None,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &str,
        _: &ProductPayload,
    ) -> Result<CatalogProduct, CatalogError> {
        Err(CatalogError(format!("Product {id} not found")))
    }
}

async fn start_server() -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };
    let service = StorefrontService::new(InMemoryLedger::new(), Quiet);
    let editor = CatalogEditor::new(Catalog::default());
    let identity = StaticTokenIdentity::new(vec!["admin-token".into()]);
    let server = HttpServer::new(service, editor, identity, config).await.unwrap();

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

#[tokio::test]
async fn cart_checkout_and_orders_over_http() {
    let (addr, handle) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/checkout/start", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Your cart is empty. Add products before placing an order."
    );

    let cart: Value = client
        .post(format!("{}/cart/items", addr))
        .json(&json!({
            "id": "hinges-soft-close",
            "name": "Soft-close hinge",
            "unit_price_paise": 250,
            "quantity": "2",
            "category_label": "Hinges"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total_paise"], 500);

    let cart: Value = client
        .patch(format!("{}/cart/items/hinges-soft-close", addr))
        .json(&json!({ "quantity": -3 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["quantity"], 1);

    let res = client
        .post(format!("{}/checkout/start", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client
        .post(format!("{}/checkout/submit", addr))
        .json(&json!({ "customer_name": "Asha", "contact_number": "", "delivery_address": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/checkout/submit", addr))
        .json(&json!({
            "customer_name": "Asha",
            "contact_number": "9876543210",
            "delivery_address": "Plot 12, Nashik"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let receipt: Value = res.json().await.unwrap();
    let order_id = receipt["order_id"].as_str().unwrap().to_string();
    assert!(receipt["deep_link"].as_str().unwrap().starts_with("https://wa.me/"));

    let orders: Vec<Value> = client
        .get(format!("{}/orders", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id.as_str());
    assert_eq!(orders[0]["total_paise"], 250);
    assert_eq!(orders[0]["status"], "Processing");

    let res = client
        .patch(format!("{}/orders/{}/status", addr, order_id))
        .json(&json!({ "status": "Confirmed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .patch(format!("{}/orders/{}/status", addr, order_id))
        .bearer_auth("admin-token")
        .json(&json!({ "status": "Confirmed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client
        .get(format!("{}/orders/MOD-0-missing", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client.post(format!("{}/orders", addr)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    handle.abort();
}

#[tokio::test]
async fn admin_catalog_is_gated_and_merges_saves() {
    let (addr, handle) = start_server().await;
    let client = reqwest::Client::new();
    let category = json!({
        "name": "Drawer Channels",
        "heroLine": "Smooth travel",
        "description": "Ball-bearing slides"
    });

    let res = client
        .post(format!("{}/admin/categories", addr))
        .json(&category)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/admin/categories", addr))
        .bearer_auth("shopper")
        .json(&category)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/admin/categories", addr))
        .bearer_auth("admin-token")
        .json(&json!({ "name": "No hero line" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/admin/categories", addr))
        .bearer_auth("admin-token")
        .json(&category)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let saved: Value = res.json().await.unwrap();
    assert_eq!(saved["notice"], "Category created successfully.");
    assert_eq!(saved["record"]["id"], "drawer-channels");

    let res = client
        .post(format!("{}/admin/categories/drawer-channels/products", addr))
        .bearer_auth("admin-token")
        .json(&json!({
            "name": "Telescopic slide",
            "description": "450mm",
            "price": "",
            "specs": "450mm, zinc"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let saved: Value = res.json().await.unwrap();
    assert_eq!(saved["record"]["image"], "/images/placeholder.png");
    assert_eq!(saved["record"]["price"], Value::Null);

    let res = client
        .put(format!("{}/admin/categories/missing", addr))
        .bearer_auth("admin-token")
        .json(&category)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Category missing not found");

    let view: Value = client
        .get(format!("{}/admin/catalog", addr))
        .bearer_auth("admin-token")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["categories"].as_array().unwrap().len(), 1);
    assert_eq!(view["products"]["drawer-channels"][0]["name"], "Telescopic slide");

    let products: Value = client
        .get(format!("{}/catalog/products?category=drawer-channels", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(products["products"].as_array().unwrap().len(), 1);

    let res = client
        .post(format!("{}/admin/categories/drawer-channels/products", addr))
        .bearer_auth("admin-token")
        .json(&json!({ "name": "Undermount slide", "description": "Soft close", "price": "99.5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);

    let cart: Value = client
        .post(format!("{}/cart/products", addr))
        .json(&json!({ "product_id": "drawer-channels-2", "category_id": "drawer-channels", "quantity": 3 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["unit_price_paise"], 9950);
    assert_eq!(cart["items"][0]["category_label"], "Drawer Channels");
    assert_eq!(cart["total_paise"], 29850);

    let res = client
        .post(format!("{}/cart/products", addr))
        .json(&json!({ "product_id": "nope", "category_id": "drawer-channels" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    handle.abort();
}
