// SPDX-License-Identifier: GPL-3.0-only
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};
use crate::catalog::{CatalogClient, CatalogError};
use crate::navigation::{Navigator, Route};
use crate::sync::engine::{CatalogSnapshot, CatalogSyncEngine, FetchOutcome, FetchRequest};
use crate::sync::error::EngineStopped;

#[derive(Debug)]
enum Command {
    SelectCategory(String),
    Refresh,
    Shutdown,
}

/// View-side handle of one mounted catalog screen. Dropping every clone,
/// or calling [`CatalogHandle::shutdown`] on any of them, unmounts the screen.
#[derive(Clone)]
pub struct CatalogHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<CatalogSnapshot>,
    navigator: Arc<dyn Navigator>,
}

impl CatalogHandle {
    /// Latest published snapshot
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshots.clone()
    }

    pub fn select_category(&self, id: impl Into<String>) -> Result<(), EngineStopped> {
        self.commands
            .send(Command::SelectCategory(id.into()))
            .map_err(|_| EngineStopped)
    }

    /// Re-run the initial load for the current selection
    pub fn refresh(&self) -> Result<(), EngineStopped> {
        self.commands.send(Command::Refresh).map_err(|_| EngineStopped)
    }

    /// Unmount now, even while other clones are still alive
    pub fn shutdown(&self) {
        // already stopped is fine
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Hand the product over to navigation as is
    pub fn select_product(&self, id: &str) -> Route {
        let route = Route::ProductDetail(id.to_string());
        self.navigator.navigate(route.clone());
        route
    }
}

/// Mount a catalog screen: spawn the task owning its engine and start the
/// initial load.
pub fn spawn_catalog_engine(
    client: Arc<dyn CatalogClient>,
    navigator: Arc<dyn Navigator>,
) -> (CatalogHandle, JoinHandle<()>) {
    let engine = CatalogSyncEngine::new();
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let driver = EngineDriver {
        engine,
        client,
        in_flight: JoinSet::new(),
        snapshots: snapshot_tx,
    };
    let task = tokio::spawn(driver.run(command_rx));

    let handle = CatalogHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        navigator,
    };
    (handle, task)
}

struct EngineDriver {
    engine: CatalogSyncEngine,
    client: Arc<dyn CatalogClient>,
    in_flight: JoinSet<FetchOutcome>,
    snapshots: watch::Sender<CatalogSnapshot>,
}

impl EngineDriver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!("Catalog screen mounted");
        let requests = self.engine.activate();
        self.dispatch(requests);
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::SelectCategory(id)) => {
                        if let Some(request) = self.engine.select_category(&id) {
                            self.dispatch(vec![request]);
                        }
                    }
                    Some(Command::Refresh) => {
                        let requests = self.engine.activate();
                        self.dispatch(requests);
                    }
                    Some(Command::Shutdown) => {
                        debug!("Catalog screen shutdown requested");
                        break;
                    }
                    None => break,
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => match joined {
                    Ok(outcome) => {
                        let requests = self.engine.complete(outcome);
                        self.dispatch(requests);
                    }
                    Err(e) => {
                        error!(error = %e, "Catalog fetch task died");
                    }
                },
            }

            self.publish();
        }

        let diagnostics = self.engine.diagnostics();
        info!(
            in_flight = self.in_flight.len(),
            network_failures = diagnostics.network_failures,
            partial_failures = diagnostics.partial_failures,
            stale_discarded = diagnostics.stale_discarded,
            "Catalog screen unmounted"
        );
    }

    fn dispatch(&mut self, requests: Vec<FetchRequest>) {
        for request in requests {
            debug!(request = ?request, "Issuing catalog fetch");
            let client = Arc::clone(&self.client);
            self.in_flight.spawn(async move {
                let issued = request.clone();
                match AssertUnwindSafe(request.run(client.as_ref())).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        error!(request = ?issued, "Catalog fetch panicked");
                        issued.fail(CatalogError::Panicked)
                    }
                }
            });
        }
    }

    fn publish(&self) {
        let snapshot = self.engine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::engine::SyncPhase;
    use crate::test_helpers::{
        category, product, GatedCatalogClient, PanickingCatalogClient, RecordingNavigator,
        ScriptedCatalogClient,
    };
    use std::time::Duration;

    fn menu() -> Vec<crate::catalog::CategoryRecord> {
        vec![
            category("c1", "Latte", true, 2),
            category("c2", "Tea", true, 1),
            category("c3", "Hidden", false, 0),
        ]
    }

    async fn wait_for_phase(handle: &CatalogHandle, phase: SyncPhase) -> CatalogSnapshot {
        let mut receiver = handle.subscribe();
        let snapshot = receiver.wait_for(|s| s.phase == phase).await.unwrap();
        snapshot.clone()
    }

    /// Let every spawned task run until nothing is left to do
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    fn product_ids(snapshot: &CatalogSnapshot) -> Vec<String> {
        snapshot.state.products.iter().map(|p| p.id.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_categories_and_products() {
        let client = Arc::new(ScriptedCatalogClient::new(menu(), vec![
            product("p1", "c1", true),
            product("p2", "c2", false),
        ]));
        let (handle, _task) = spawn_catalog_engine(client.clone(), Arc::new(RecordingNavigator::default()));

        let snapshot = wait_for_phase(&handle, SyncPhase::Ready).await;

        let ids: Vec<&str> = snapshot.state.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["all", "c2", "c1"]);
        assert_eq!(product_ids(&snapshot), vec!["p1"]);
        assert_eq!(client.category_calls(), 1);
        assert_eq!(client.product_calls(), vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_failure_still_shows_products() {
        let client = Arc::new(
            ScriptedCatalogClient::new(menu(), vec![product("p1", "c1", true)]).failing_categories(),
        );
        let (handle, _task) = spawn_catalog_engine(client, Arc::new(RecordingNavigator::default()));

        let snapshot = wait_for_phase(&handle, SyncPhase::PartialFailure).await;

        assert_eq!(snapshot.state.categories.len(), 1);
        assert_eq!(snapshot.state.categories[0].id, "all");
        assert_eq!(product_ids(&snapshot), vec!["p1"]);
        assert!(!snapshot.state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_products_failure_still_shows_categories() {
        let client = Arc::new(ScriptedCatalogClient::new(menu(), Vec::new()).failing_products());
        let (handle, _task) = spawn_catalog_engine(client, Arc::new(RecordingNavigator::default()));

        let snapshot = wait_for_phase(&handle, SyncPhase::PartialFailure).await;

        assert_eq!(snapshot.state.categories.len(), 3);
        assert!(snapshot.state.products.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_category_fetches_once() {
        let client = Arc::new(ScriptedCatalogClient::new(menu(), vec![product("p1", "c1", true)]));
        let (handle, _task) = spawn_catalog_engine(client.clone(), Arc::new(RecordingNavigator::default()));
        wait_for_phase(&handle, SyncPhase::Ready).await;

        handle.select_category("c1").unwrap();
        settle().await;
        handle.select_category("c1").unwrap();
        settle().await;

        assert_eq!(client.product_calls(), vec![None, Some("c1".to_string())]);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SyncPhase::Ready);
        assert_eq!(snapshot.state.selected_category_id, "c1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() {
        let client = Arc::new(GatedCatalogClient::new(menu()));
        let (handle, _task) = spawn_catalog_engine(client.clone(), Arc::new(RecordingNavigator::default()));

        settle().await;
        client.release_products(0, vec![product("p0", "c1", true)]);
        wait_for_phase(&handle, SyncPhase::Ready).await;

        handle.select_category("c1").unwrap();
        settle().await;
        handle.select_category("c2").unwrap();
        settle().await;
        assert_eq!(client.pending_products(), 2);

        client.release_products(2, vec![product("tea", "c2", true)]);
        let snapshot = wait_for_phase(&handle, SyncPhase::Ready).await;
        assert_eq!(product_ids(&snapshot), vec!["tea"]);

        client.release_products(1, vec![product("latte", "c1", true)]);
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(product_ids(&snapshot), vec!["tea"]);
        assert_eq!(snapshot.state.selected_category_id, "c2");
        assert_eq!(snapshot.phase, SyncPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reloads_everything() {
        let client = Arc::new(ScriptedCatalogClient::new(menu(), vec![product("p1", "c1", true)]));
        let (handle, _task) = spawn_catalog_engine(client.clone(), Arc::new(RecordingNavigator::default()));
        wait_for_phase(&handle, SyncPhase::Ready).await;

        handle.refresh().unwrap();
        settle().await;

        assert_eq!(client.category_calls(), 2);
        assert_eq!(client.product_calls().len(), 2);
        assert_eq!(handle.snapshot().phase, SyncPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_product_forwards_route() {
        let client = Arc::new(ScriptedCatalogClient::new(menu(), Vec::new()));
        let navigator = Arc::new(RecordingNavigator::default());
        let (handle, _task) = spawn_catalog_engine(client, navigator.clone());

        let route = handle.select_product("p-7");

        assert_eq!(route, Route::ProductDetail("p-7".to_string()));
        assert_eq!(navigator.routes(), vec![Route::ProductDetail("p-7".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_engine() {
        let client = Arc::new(GatedCatalogClient::new(menu()));
        let (handle, task) = spawn_catalog_engine(client, Arc::new(RecordingNavigator::default()));
        settle().await;

        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("engine should stop after unmount")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_engine_with_live_handles() {
        let client = Arc::new(GatedCatalogClient::new(menu()));
        let (handle, task) = spawn_catalog_engine(client, Arc::new(RecordingNavigator::default()));
        let view = handle.clone();
        let mut snapshots = handle.subscribe();
        settle().await;

        handle.shutdown();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("engine should stop on shutdown")
            .unwrap();
        snapshots.borrow_and_update();
        assert!(snapshots.changed().await.is_err());
        assert!(view.select_category("c1").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_resolves_loading() {
        let client = Arc::new(PanickingCatalogClient::new(menu()));
        let (handle, _task) = spawn_catalog_engine(client, Arc::new(RecordingNavigator::default()));

        let snapshot = wait_for_phase(&handle, SyncPhase::PartialFailure).await;

        assert_eq!(snapshot.state.categories.len(), 3);
        assert!(snapshot.state.products.is_empty());
        assert!(!snapshot.state.is_loading);
    }
}
