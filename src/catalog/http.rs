// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use crate::auth::TokenProvider;
use crate::catalog::error::CatalogError;
use crate::catalog::models::{CategoryRecord, ProductRecord};
use crate::catalog::traits::{CatalogClient, ALL_CATEGORY_ID};

/// Catalog service reached over its public menu endpoints
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpCatalogClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, CatalogError> {
        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::Rejected(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("BrewStorefrontClient/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn build_request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url);

        if let Some(token) = self.tokens.current_token() {
            request = request.bearer_auth(token);
        }

        request
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, CatalogError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Catalog request failed");
            return Err(CatalogError::Status { status, body });
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            let message = envelope.message.unwrap_or_else(|| "no message".to_string());
            return Err(CatalogError::Rejected(message));
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::Rejected("response carried no data".to_string()))
    }
}

/// Response wrapper used by every catalog endpoint
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        debug!("Fetching categories");

        let categories: Vec<CategoryRecord> = self.send(self.build_request("menu/categories")).await?;
        info!(count = categories.len(), "Fetched categories");

        Ok(categories)
    }

    async fn fetch_products(&self, category_id: Option<&str>) -> Result<Vec<ProductRecord>, CatalogError> {
        let category_id = category_id.filter(|id| *id != ALL_CATEGORY_ID);
        debug!(category = category_id.unwrap_or(ALL_CATEGORY_ID), "Fetching products");

        let mut request = self.build_request("menu/items");
        if let Some(id) = category_id {
            request = request.query(&[("category", id)]);
        }

        let products: Vec<ProductRecord> = self.send(request).await?;
        let fetched = products.len();

        let products: Vec<ProductRecord> = products
            .into_iter()
            .filter(|p| {
                if p.price < Decimal::ZERO {
                    warn!(product_id = %p.id, price = %p.price, "Dropping product with negative price");
                    false
                } else {
                    true
                }
            })
            .collect();

        info!(
            category = category_id.unwrap_or(ALL_CATEGORY_ID),
            count = products.len(),
            dropped = fetched - products.len(),
            "Fetched products"
        );

        Ok(products)
    }
}
