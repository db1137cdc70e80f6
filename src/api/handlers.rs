// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, info};

use crate::navigation::{LogNavigator, Route};
use crate::sync::{CatalogHandle, CatalogSnapshot};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// View-facing operations shared by the HTTP and WebSocket surfaces
pub struct ApiHandlers {
    catalog: CatalogHandle,
    navigator: Arc<LogNavigator>,
}

impl ApiHandlers {
    pub fn new(catalog: CatalogHandle, navigator: Arc<LogNavigator>) -> Self {
        Self { catalog, navigator }
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.catalog.subscribe()
    }

    pub fn routes(&self) -> broadcast::Receiver<Route> {
        self.navigator.subscribe()
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub fn get_catalog(&self) -> Json<ApiResponse<CatalogSnapshot>> {
        Json(ApiResponse::success(self.catalog.snapshot()))
    }

    pub fn select_category(
        &self,
        Path(id): Path<String>,
    ) -> Result<Json<ApiResponse<()>>, StatusCode> {
        info!(category = %id, "Select category request received");

        match self.catalog.select_category(id) {
            Ok(()) => Ok(Json(ApiResponse::success(()))),
            Err(e) => {
                error!(error = %e, "Failed to select category");
                Err(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }

    pub fn open_product(&self, Path(id): Path<String>) -> Json<ApiResponse<Route>> {
        Json(ApiResponse::success(self.select_product(&id)))
    }

    /// Hand a product to navigation; the route is also broadcast to views
    pub fn select_product(&self, id: &str) -> Route {
        info!(product_id = %id, "Open product request received");
        self.catalog.select_product(id)
    }

    pub fn refresh(&self) -> Result<Json<ApiResponse<()>>, StatusCode> {
        match self.catalog.refresh() {
            Ok(()) => {
                info!("Catalog refresh requested");
                Ok(Json(ApiResponse::success(())))
            }
            Err(e) => {
                error!(error = %e, "Failed to refresh catalog");
                Err(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}
