use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, patch, post, put},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::catalog_editor::{CatalogEditor, CatalogView, Saved};
use crate::application::checkout::CheckoutReceipt;
use crate::application::storefront_service::{CartView, PlacedOrder, StorefrontService};
use crate::errors::AppError;
use storefront_types::domain::cart::{parse_quantity_input, LineItem};
use storefront_types::domain::catalog::{CatalogCategory, CatalogProduct, CategoryForm, ProductForm};
use storefront_types::domain::checkout::{CheckoutDetails, CheckoutPhase};
use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::catalog_store::CatalogStore;
use storefront_types::ports::identity::{IdentityOracle, Role};
use storefront_types::ports::messaging::Messenger;
use storefront_types::ports::order_ledger::OrderLedger;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

/// Everything the handlers reach: the shopper session, the admin catalog
/// editor and the identity oracle gating `/admin`.
pub struct AppState<L: OrderLedger, M: Messenger, C: CatalogStore> {
    pub service: StorefrontService<L, M>,
    pub editor: CatalogEditor<C>,
    pub identity: Arc<dyn IdentityOracle>,
}

#[derive(Clone)]
pub struct HttpServer<L: OrderLedger, M: Messenger, C: CatalogStore> {
    pub state: Arc<AppState<L, M, C>>,
    pub config: HttpServerConfig,
}

type Shared<L, M, C> = State<Arc<AppState<L, M, C>>>;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit_price_paise: i64,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub category_label: Option<String>,
}

#[derive(Deserialize)]
pub struct AddProductRequest {
    pub product_id: String,
    pub category_id: String,
    #[serde(default)]
    pub quantity: Value,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(default)]
    pub quantity: Value,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
struct PhaseResponse {
    phase: CheckoutPhase,
}

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<CatalogCategory>,
}

#[derive(Serialize)]
struct ProductsResponse {
    products: Vec<CatalogProduct>,
}

/// Form quantities arrive as numbers or free text; both go through the same
/// coercion. Anything else counts as one.
fn coerce_quantity(raw: &Value) -> u32 {
    match raw {
        Value::Number(n) => parse_quantity_input(&n.to_string()),
        Value::String(s) => parse_quantity_input(s),
        _ => 1,
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn require_admin<L, M, C>(state: &AppState<L, M, C>, headers: &HeaderMap) -> Result<(), AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    match state.identity.role(bearer_token(headers)).await {
        Role::Admin => Ok(()),
        Role::Customer => Err(AppError::Forbidden),
        Role::Anonymous => Err(AppError::Unauthorized),
    }
}

impl<L, M, C> HttpServer<L, M, C>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    pub async fn new(
        service: StorefrontService<L, M>,
        editor: CatalogEditor<C>,
        identity: impl IdentityOracle,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(AppState {
                service,
                editor,
                identity: Arc::new(identity),
            }),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(|request: &axum::extract::Request<_>, span: &tracing::Span| {
                tracing::info!(
                    parent: span,
                    method = %request.method(),
                    uri = %request.uri(),
                    "request"
                );
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/catalog/categories", get(browse_categories::<L, M, C>))
            .route("/catalog/products", get(browse_products::<L, M, C>))
            .route("/cart", get(get_cart::<L, M, C>))
            .route("/cart/items", post(add_item::<L, M, C>))
            .route("/cart/products", post(add_product::<L, M, C>))
            .route(
                "/cart/items/{id}",
                patch(update_item::<L, M, C>).delete(remove_item::<L, M, C>),
            )
            .route("/orders", post(place_order::<L, M, C>).get(list_orders::<L, M, C>))
            .route("/orders/{id}", get(get_order::<L, M, C>))
            .route("/orders/{id}/status", patch(update_status::<L, M, C>))
            .route("/checkout", get(checkout_phase::<L, M, C>))
            .route("/checkout/start", post(start_checkout::<L, M, C>))
            .route("/checkout/cancel", post(cancel_checkout::<L, M, C>))
            .route("/checkout/submit", post(submit_checkout::<L, M, C>))
            .route("/admin/catalog", get(admin_view::<L, M, C>))
            .route(
                "/admin/categories",
                get(admin_load_categories::<L, M, C>).post(admin_create_category::<L, M, C>),
            )
            .route("/admin/categories/{id}", put(admin_update_category::<L, M, C>))
            .route(
                "/admin/categories/{id}/products",
                get(admin_load_products::<L, M, C>).post(admin_create_product::<L, M, C>),
            )
            .route(
                "/admin/categories/{id}/products/{product_id}",
                put(admin_update_product::<L, M, C>),
            )
            .layer(trace_layer)
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn browse_categories<L, M, C>(
    State(state): Shared<L, M, C>,
) -> Result<Json<CategoriesResponse>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let categories = state.editor.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn browse_products<L, M, C>(
    State(state): Shared<L, M, C>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductsResponse>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let products = state.editor.list_products(query.category.as_deref()).await?;
    Ok(Json(ProductsResponse { products }))
}

async fn get_cart<L, M, C>(State(state): Shared<L, M, C>) -> Json<CartView>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Json(state.service.cart().await)
}

async fn add_item<L, M, C>(
    State(state): Shared<L, M, C>,
    Json(payload): Json<AddItemRequest>,
) -> Json<CartView>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let mut item = LineItem::new(
        payload.id,
        payload.name,
        payload.unit_price_paise,
        coerce_quantity(&payload.quantity),
    );
    item.category_label = payload.category_label;
    Json(state.service.add_to_cart(item).await)
}

/// Adds a catalog product at its current list rate, labelled with its
/// category name when the catalog can supply one.
async fn add_product<L, M, C>(
    State(state): Shared<L, M, C>,
    Json(payload): Json<AddProductRequest>,
) -> Result<Json<CartView>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let product = state
        .editor
        .list_products(Some(&payload.category_id))
        .await?
        .into_iter()
        .find(|p| p.id == payload.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", payload.product_id)))?;

    let label = match state.editor.list_categories().await {
        Ok(categories) => categories
            .into_iter()
            .find(|c| c.id == product.category_id)
            .map(|c| c.name),
        Err(e) => {
            tracing::warn!(error = %e, "category label unavailable");
            None
        }
    };

    let item = LineItem::from_product(&product, coerce_quantity(&payload.quantity), label);
    Ok(Json(state.service.add_to_cart(item).await))
}

async fn update_item<L, M, C>(
    State(state): Shared<L, M, C>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Json<CartView>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let quantity = i64::from(coerce_quantity(&payload.quantity));
    Json(state.service.update_quantity(&id, quantity).await)
}

async fn remove_item<L, M, C>(State(state): Shared<L, M, C>, Path(id): Path<String>) -> Json<CartView>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Json(state.service.remove_from_cart(&id).await)
}

async fn place_order<L, M, C>(
    State(state): Shared<L, M, C>,
) -> Result<(StatusCode, Json<PlacedOrder>), AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let placed = state.service.place_order().await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

async fn list_orders<L, M, C>(State(state): Shared<L, M, C>) -> Result<Json<Vec<Order>>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Ok(Json(state.service.orders().await?))
}

async fn get_order<L, M, C>(
    State(state): Shared<L, M, C>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Ok(Json(state.service.get_order(&id).await?))
}

async fn update_status<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    let updated = state.service.advance_order_status(&id, payload.status).await?;
    Ok(Json(updated))
}

async fn checkout_phase<L, M, C>(State(state): Shared<L, M, C>) -> Json<PhaseResponse>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Json(PhaseResponse {
        phase: state.service.checkout_phase().await,
    })
}

async fn start_checkout<L, M, C>(State(state): Shared<L, M, C>) -> Result<Json<PhaseResponse>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let phase = state.service.start_checkout().await?;
    Ok(Json(PhaseResponse { phase }))
}

async fn cancel_checkout<L, M, C>(State(state): Shared<L, M, C>) -> Json<PhaseResponse>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    Json(PhaseResponse {
        phase: state.service.cancel_checkout().await,
    })
}

async fn submit_checkout<L, M, C>(
    State(state): Shared<L, M, C>,
    Json(details): Json<CheckoutDetails>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    let receipt = state.service.submit_checkout(details).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn admin_view<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
) -> Result<Json<CatalogView>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    Ok(Json(state.editor.view().await))
}

async fn admin_load_categories<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
) -> Result<Json<CategoriesResponse>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    let categories = state.editor.load_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn admin_create_category<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Saved<CatalogCategory>>), AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    let saved = state.editor.create_category(form).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn admin_update_category<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Saved<CatalogCategory>>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    Ok(Json(state.editor.update_category(&id, form).await?))
}

async fn admin_load_products<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ProductsResponse>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    let products = state.editor.load_products(&id).await?;
    Ok(Json(ProductsResponse { products }))
}

async fn admin_create_product<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<Saved<CatalogProduct>>), AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    let saved = state.editor.create_product(&id, form).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn admin_update_product<L, M, C>(
    State(state): Shared<L, M, C>,
    headers: HeaderMap,
    Path((id, product_id)): Path<(String, String)>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Saved<CatalogProduct>>, AppError>
where
    L: OrderLedger,
    M: Messenger,
    C: CatalogStore,
{
    require_admin(&state, &headers).await?;
    Ok(Json(state.editor.update_product(&id, &product_id, form).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn quantities_are_coerced_at_the_boundary() {
        assert_eq!(coerce_quantity(&serde_json::json!(3)), 3);
        assert_eq!(coerce_quantity(&serde_json::json!(2.9)), 2);
        assert_eq!(coerce_quantity(&serde_json::json!(-4)), 1);
        assert_eq!(coerce_quantity(&serde_json::json!("7")), 7);
        assert_eq!(coerce_quantity(&serde_json::json!("lots")), 1);
        assert_eq!(coerce_quantity(&Value::Null), 1);
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(bearer_token(&headers), Some("s3cret"));
    }
}
