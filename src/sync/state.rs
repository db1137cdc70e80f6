// SPDX-License-Identifier: GPL-3.0-only
use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::catalog::{ProductRecord, ALL_CATEGORY_ID};
use crate::sync::categories::FilterCategory;

/// Tag carried by every products fetch. Only the newest one may land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the catalog screen renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub selected_category_id: String,
    pub products: Vec<ProductRecord>,
    pub categories: Vec<FilterCategory>,
    pub is_loading: bool,
    pub generation: Generation,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            selected_category_id: ALL_CATEGORY_ID.to_string(),
            products: Vec::new(),
            categories: Vec::new(),
            is_loading: false,
            generation: Generation::default(),
        }
    }
}

/// Owner of [`SyncState`]. Every transition builds its result before
/// assigning, so readers never see a half-applied update.
#[derive(Debug, Default)]
pub struct ProductFilterState {
    state: SyncState,
    categories_loaded: bool,
}

impl ProductFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn selected_category_id(&self) -> &str {
        &self.state.selected_category_id
    }

    pub fn categories_loaded(&self) -> bool {
        self.categories_loaded
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.state.generation == generation
    }

    /// Whether `id` can be selected. Anything goes until categories load.
    pub fn is_selectable(&self, id: &str) -> bool {
        id == ALL_CATEGORY_ID
            || !self.categories_loaded
            || self.state.categories.iter().any(|c| c.id == id)
    }

    /// Start a products fetch. Returns the tag the fetch must carry.
    pub fn begin_load(&mut self) -> Generation {
        let generation = Generation(self.state.generation.0 + 1);
        self.state.generation = generation;
        self.state.is_loading = true;
        generation
    }

    /// Replace the filter list. Returns `true` if the selection was not
    /// part of it and fell back to "all".
    pub fn apply_categories(&mut self, categories: Vec<FilterCategory>) -> bool {
        let selected = &self.state.selected_category_id;
        let keep = selected == ALL_CATEGORY_ID || categories.iter().any(|c| &c.id == selected);

        if !keep {
            debug!(category = %selected, "Selected category vanished, falling back to all");
            self.state.selected_category_id = ALL_CATEGORY_ID.to_string();
        }
        self.state.categories = categories;
        self.categories_loaded = true;

        !keep
    }

    /// Land a products response. Stale generations are ignored and
    /// reported as `false`.
    pub fn apply_products(&mut self, generation: Generation, products: Vec<ProductRecord>) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        let visible: Vec<ProductRecord> = products.into_iter().filter(|p| p.available).collect();
        self.state.products = visible;
        self.state.is_loading = false;
        true
    }

    /// Close a failed fetch, keeping the last good product list
    pub fn apply_failure(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        self.state.is_loading = false;
        true
    }

    /// Change the selection only. Fetching is the engine's job.
    pub fn select_category(&mut self, id: &str) {
        self.state.selected_category_id = id.to_string();
    }
}
