use serde::Deserialize;
use std::env;
use std::time::Duration;

use anyhow::Context;
use storefront_types::domain::message::{DEFAULT_STORE_NAME, SUPPORT_PHONE_E164};

pub const DEFAULT_CATALOG_BASE_URL: &str = "http://127.0.0.1:4000/api/catalog/";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub catalog_base_url: String,
    pub catalog_api_key: Option<String>,
    pub catalog_timeout: Duration,
    pub support_phone: String,
    pub store_name: String,
    pub admin_tokens: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_port = get("SERVER_PORT").unwrap_or_else(|| "3000".into());
        let database_url = get("DATABASE_URL");
        let catalog_base_url =
            get("CATALOG_BASE_URL").unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.into());
        let catalog_api_key = get("CATALOG_API_KEY");
        let catalog_timeout = match get("CATALOG_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("CATALOG_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            None => Duration::from_secs(10),
        };
        let support_phone = get("SUPPORT_PHONE").unwrap_or_else(|| SUPPORT_PHONE_E164.into());
        let store_name = get("STORE_NAME").unwrap_or_else(|| DEFAULT_STORE_NAME.into());
        let admin_tokens = get("ADMIN_TOKENS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_port,
            database_url,
            catalog_base_url,
            catalog_api_key,
            catalog_timeout,
            support_phone,
            store_name,
            admin_tokens,
        })
    }
}
