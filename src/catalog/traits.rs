// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::catalog::error::CatalogError;
use crate::catalog::models::{CategoryRecord, ProductRecord};

/// Category id that stands for the unfiltered product list
pub const ALL_CATEGORY_ID: &str = "all";

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch every category known to the catalog service
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError>;

    /// Fetch menu items, optionally scoped to one category.
    /// `None` and `Some("all")` both mean unfiltered.
    async fn fetch_products(&self, category_id: Option<&str>) -> Result<Vec<ProductRecord>, CatalogError>;
}
