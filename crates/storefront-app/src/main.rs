use storefront_client::{CatalogClient, WhatsAppMessenger};
use storefront_hex::application::catalog_editor::CatalogEditor;
use storefront_hex::application::storefront_service::{MessagingConfig, StorefrontService};
use storefront_hex::config::Config;
use storefront_hex::identity::StaticTokenIdentity;
use storefront_hex::inbound::http::{HttpServer, HttpServerConfig};
use storefront_repo::{build_ledger, Ledger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / CATALOG_* / ADMIN_TOKENS when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let ledger: Ledger = build_ledger(config.database_url.as_deref()).await?;

    let mut catalog = CatalogClient::builder(&config.catalog_base_url)?.with_timeout(config.catalog_timeout);
    if let Some(key) = &config.catalog_api_key {
        catalog = catalog.with_header("apikey", key)?;
    }
    let catalog = catalog.build()?;
    tracing::info!(base = %config.catalog_base_url, "catalog client ready");

    if config.admin_tokens.is_empty() {
        tracing::warn!("ADMIN_TOKENS is empty, the admin surface is closed");
    }

    let service = StorefrontService::with_messaging(
        ledger,
        WhatsAppMessenger::new(),
        MessagingConfig {
            store_name: config.store_name.clone(),
            support_phone: config.support_phone.clone(),
        },
    );
    let editor = CatalogEditor::new(catalog);
    let identity = StaticTokenIdentity::new(config.admin_tokens.clone());

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(service, editor, identity, server_cfg).await?;
    http.run().await
}
