// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::catalog::{CatalogClient, CatalogError, CategoryRecord, ProductRecord, ALL_CATEGORY_ID};
use crate::sync::categories::normalize;
use crate::sync::error::{Resource, SyncFailure};
use crate::sync::state::{Generation, ProductFilterState, SyncState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Loading,
    Ready,
    /// Ready, but some part of the screen is empty or stale
    PartialFailure,
}

/// Value published to the view after every transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub phase: SyncPhase,
    #[serde(flatten)]
    pub state: SyncState,
}

/// A fetch the engine wants issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Categories { epoch: u64 },
    Products { generation: Generation, category_id: Option<String> },
}

impl FetchRequest {
    /// Perform the fetch. Never fails; errors travel inside the outcome.
    pub async fn run(self, client: &dyn CatalogClient) -> FetchOutcome {
        match self {
            FetchRequest::Categories { epoch } => FetchOutcome::Categories {
                epoch,
                result: client.fetch_categories().await,
            },
            FetchRequest::Products { generation, category_id } => {
                let result = client.fetch_products(category_id.as_deref()).await;
                FetchOutcome::Products { generation, category_id, result }
            }
        }
    }

    /// Outcome for a fetch that never produced an answer of its own
    pub fn fail(self, error: CatalogError) -> FetchOutcome {
        match self {
            FetchRequest::Categories { epoch } => FetchOutcome::Categories {
                epoch,
                result: Err(error),
            },
            FetchRequest::Products { generation, category_id } => FetchOutcome::Products {
                generation,
                category_id,
                result: Err(error),
            },
        }
    }
}

/// A finished fetch, tagged with what it was issued under
#[derive(Debug)]
pub enum FetchOutcome {
    Categories {
        epoch: u64,
        result: Result<Vec<CategoryRecord>, CatalogError>,
    },
    Products {
        generation: Generation,
        category_id: Option<String>,
        result: Result<Vec<ProductRecord>, CatalogError>,
    },
}

/// Counters kept for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub network_failures: u64,
    pub partial_failures: u64,
    pub stale_discarded: u64,
}

/// Tracks the two fetches of an activation until both have answered
#[derive(Debug)]
struct Activation {
    products_generation: Generation,
    categories_ok: Option<bool>,
    products_ok: Option<bool>,
}

/// Catalog screen state machine. Commands return the fetches to issue;
/// results come back through [`CatalogSyncEngine::complete`] in whatever
/// order they finish.
#[derive(Debug)]
pub struct CatalogSyncEngine {
    state: ProductFilterState,
    phase: SyncPhase,
    activated: bool,
    categories_epoch: u64,
    categories_pending: bool,
    categories_failed: bool,
    products_failed: bool,
    activation: Option<Activation>,
    diagnostics: Diagnostics,
    last_failure: Option<SyncFailure>,
}

impl Default for CatalogSyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSyncEngine {
    pub fn new() -> Self {
        Self {
            state: ProductFilterState::new(),
            phase: SyncPhase::Idle,
            activated: false,
            categories_epoch: 0,
            categories_pending: false,
            categories_failed: false,
            products_failed: false,
            activation: None,
            diagnostics: Diagnostics::default(),
            last_failure: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn state(&self) -> &SyncState {
        self.state.state()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn last_failure(&self) -> Option<&SyncFailure> {
        self.last_failure.as_ref()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            phase: self.phase,
            state: self.state.state().clone(),
        }
    }

    /// Screen mount, or an explicit refresh: load categories and the
    /// product list for the current selection side by side.
    pub fn activate(&mut self) -> Vec<FetchRequest> {
        self.categories_epoch += 1;
        self.categories_pending = true;
        self.categories_failed = false;
        self.products_failed = false;
        self.activated = true;

        let generation = self.state.begin_load();
        self.activation = Some(Activation {
            products_generation: generation,
            categories_ok: None,
            products_ok: None,
        });
        self.update_phase();

        info!(
            epoch = self.categories_epoch,
            generation = %generation,
            category = %self.state.selected_category_id(),
            "Activating catalog"
        );

        vec![
            FetchRequest::Categories { epoch: self.categories_epoch },
            self.products_request(generation),
        ]
    }

    /// User picked a filter. Issues at most one products fetch.
    pub fn select_category(&mut self, id: &str) -> Option<FetchRequest> {
        if id == self.state.selected_category_id() {
            debug!(category = %id, "Category already selected");
            return None;
        }
        if !self.state.is_selectable(id) {
            warn!(category = %id, "Ignoring selection of unknown category");
            return None;
        }

        self.state.select_category(id);
        if !self.activated {
            // activation will fetch for this selection
            return None;
        }

        let generation = self.state.begin_load();
        self.update_phase();
        info!(category = %id, generation = %generation, "Category selected");

        Some(self.products_request(generation))
    }

    /// Apply a finished fetch. May return a follow-up fetch when a new
    /// category list invalidated the selection.
    pub fn complete(&mut self, outcome: FetchOutcome) -> Vec<FetchRequest> {
        let follow_up = match outcome {
            FetchOutcome::Categories { epoch, result } => self.complete_categories(epoch, result),
            FetchOutcome::Products { generation, category_id, result } => {
                self.complete_products(generation, category_id, result);
                Vec::new()
            }
        };

        self.finish_activation();
        self.update_phase();
        follow_up
    }

    fn complete_categories(
        &mut self,
        epoch: u64,
        result: Result<Vec<CategoryRecord>, CatalogError>,
    ) -> Vec<FetchRequest> {
        if epoch != self.categories_epoch {
            self.record(SyncFailure::StaleResponse {
                resource: Resource::Categories,
                received: epoch,
                current: self.categories_epoch,
            });
            return Vec::new();
        }

        self.categories_pending = false;
        self.categories_failed = result.is_err();
        if let Some(activation) = self.activation.as_mut() {
            activation.categories_ok = Some(result.is_ok());
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                self.record(SyncFailure::NetworkFailure {
                    resource: Resource::Categories,
                    reason: e.to_string(),
                });
                if self.state.categories_loaded() {
                    debug!("Keeping previously loaded categories");
                    return Vec::new();
                }
                Vec::new()
            }
        };

        let categories = normalize(records);
        debug!(count = categories.len(), "Applying categories");

        let mut follow_up = Vec::new();
        if self.state.apply_categories(categories) {
            let generation = self.state.begin_load();
            info!(generation = %generation, "Selection reset to all, reloading products");
            follow_up.push(self.products_request(generation));
        }
        follow_up
    }

    fn complete_products(
        &mut self,
        generation: Generation,
        category_id: Option<String>,
        result: Result<Vec<ProductRecord>, CatalogError>,
    ) {
        let category = category_id.as_deref().unwrap_or(ALL_CATEGORY_ID);
        let ok = result.is_ok();

        let applied = match result {
            Ok(products) => {
                let fetched = products.len();
                let applied = self.state.apply_products(generation, products);
                if applied {
                    info!(
                        category = %category,
                        generation = %generation,
                        fetched,
                        visible = self.state.state().products.len(),
                        "Products applied"
                    );
                }
                applied
            }
            Err(e) => {
                let applied = self.state.apply_failure(generation);
                if applied {
                    self.record(SyncFailure::NetworkFailure {
                        resource: Resource::Products,
                        reason: e.to_string(),
                    });
                } else {
                    debug!(category = %category, error = %e, "Superseded products fetch failed");
                }
                applied
            }
        };

        if applied {
            self.products_failed = !ok;
        } else {
            self.record(SyncFailure::StaleResponse {
                resource: Resource::Products,
                received: generation.value(),
                current: self.state.state().generation.value(),
            });
        }

        if let Some(activation) = self.activation.as_mut() {
            if activation.products_generation == generation {
                // a superseded initial fetch is not a failure of the screen
                activation.products_ok = Some(ok || !applied);
            }
        }
    }

    fn finish_activation(&mut self) {
        let Some(activation) = self.activation.as_ref() else {
            return;
        };
        let (Some(categories_ok), Some(products_ok)) = (activation.categories_ok, activation.products_ok) else {
            return;
        };

        match (categories_ok, products_ok) {
            (true, true) => info!("Catalog activation complete"),
            (false, false) => warn!("Catalog activation failed, showing empty catalog"),
            (false, true) => self.record(SyncFailure::PartialDataFailure { failed: Resource::Categories }),
            (true, false) => self.record(SyncFailure::PartialDataFailure { failed: Resource::Products }),
        }
        self.activation = None;
    }

    fn products_request(&self, generation: Generation) -> FetchRequest {
        let selected = self.state.selected_category_id();
        let category_id = (selected != ALL_CATEGORY_ID).then(|| selected.to_string());
        FetchRequest::Products { generation, category_id }
    }

    fn update_phase(&mut self) {
        self.phase = if !self.activated {
            SyncPhase::Idle
        } else if self.categories_pending || self.state.state().is_loading {
            SyncPhase::Loading
        } else if self.categories_failed || self.products_failed {
            SyncPhase::PartialFailure
        } else {
            SyncPhase::Ready
        };
    }

    fn record(&mut self, failure: SyncFailure) {
        match &failure {
            SyncFailure::NetworkFailure { .. } => {
                self.diagnostics.network_failures += 1;
                warn!(failure = %failure, "Catalog fetch failed");
            }
            SyncFailure::PartialDataFailure { .. } => {
                self.diagnostics.partial_failures += 1;
                warn!(failure = %failure, "Catalog partially loaded");
            }
            SyncFailure::StaleResponse { .. } => {
                self.diagnostics.stale_discarded += 1;
                debug!(failure = %failure, "Discarding response");
            }
        }
        self.last_failure = Some(failure);
    }
}
