// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod auth;
mod catalog;
mod config;
mod logging;
mod navigation;
mod sync;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use api::{ApiHandlers, HttpServer};
use auth::StaticToken;
use catalog::{CatalogClient, HttpCatalogClient};
use config::Config;
use logging::setup_logging;
use navigation::LogNavigator;
use sync::spawn_catalog_engine;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_json)?;

    info!("Starting BrewStorefrontClient v{}", env!("CARGO_PKG_VERSION"));

    // Catalog service client
    let tokens = Arc::new(StaticToken::new(config.catalog_api_token.clone()));
    let client: Arc<dyn CatalogClient> = Arc::new(
        HttpCatalogClient::new(&config.catalog_api_url, config.request_timeout(), tokens)?
    );
    info!(url = %config.catalog_api_url, "Catalog client initialized");

    // Mount the catalog screen
    let navigator = Arc::new(LogNavigator::new());
    let (catalog, mut engine_task) = spawn_catalog_engine(client, navigator.clone());

    // Start HTTP server (WebSocket is served from the same router)
    let handlers = Arc::new(ApiHandlers::new(catalog.clone(), navigator));
    let http_server = HttpServer::new(Arc::clone(&handlers), config.local_api_bind);
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    info!("Initiating graceful shutdown...");

    // Connected views hold handles of their own, so unmount explicitly
    http_task.abort();
    let _ = http_task.await;
    catalog.shutdown();
    drop(catalog);
    drop(handlers);

    match tokio::time::timeout(SHUTDOWN_GRACE, &mut engine_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(error = %e, "Catalog engine task failed");
        }
        Err(_) => {
            warn!("Catalog engine did not stop in time, aborting");
            engine_task.abort();
        }
    }

    info!("Shutdown complete");
    Ok(())
}
