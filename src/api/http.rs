// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use crate::api::handlers::{ApiHandlers, ApiResponse};
use crate::api::websocket::WebSocketServer;
use crate::navigation::Route;
use crate::sync::CatalogSnapshot;

pub struct HttpServer {
    handlers: Arc<ApiHandlers>,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(handlers: Arc<ApiHandlers>, addr: SocketAddr) -> Self {
        Self { handlers, addr }
    }

    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/catalog", get(get_catalog_handler))
            .route("/api/catalog/category/:id", post(select_category_handler))
            .route("/api/catalog/products/:id/open", post(open_product_handler))
            .route("/api/catalog/refresh", post(refresh_handler))
            .with_state(self.handlers.clone());

        api.merge(WebSocketServer::new(self.handlers.clone()).router())
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let app = self.router();

        info!(addr = %self.addr, "Starting local view API");

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn get_catalog_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Json<ApiResponse<CatalogSnapshot>> {
    handlers.get_catalog()
}

async fn select_category_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, StatusCode> {
    handlers.select_category(Path(id))
}

async fn open_product_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<String>,
) -> Json<ApiResponse<Route>> {
    handlers.open_product(Path(id))
}

async fn refresh_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Result<Json<ApiResponse<()>>, StatusCode> {
    handlers.refresh()
}
