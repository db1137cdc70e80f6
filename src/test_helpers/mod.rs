// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Mutex;
use tokio::sync::oneshot;
use crate::catalog::{CatalogClient, CatalogError, CategoryRecord, ProductRecord};
use crate::navigation::{Navigator, Route};

pub fn category(id: &str, name: &str, active: bool, sort_order: i64) -> CategoryRecord {
    CategoryRecord::new(id, name, active, sort_order)
}

pub fn product(id: &str, category_id: &str, available: bool) -> ProductRecord {
    ProductRecord::new(id, &format!("Product {}", id), category_id, Decimal::new(2500, 2), available)
}

/// Catalog client answering immediately from fixed data
pub struct ScriptedCatalogClient {
    categories: Vec<CategoryRecord>,
    products: Vec<ProductRecord>,
    fail_categories: bool,
    fail_products: bool,
    category_calls: Mutex<usize>,
    product_calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedCatalogClient {
    pub fn new(categories: Vec<CategoryRecord>, products: Vec<ProductRecord>) -> Self {
        Self {
            categories,
            products,
            fail_categories: false,
            fail_products: false,
            category_calls: Mutex::new(0),
            product_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_categories(mut self) -> Self {
        self.fail_categories = true;
        self
    }

    pub fn failing_products(mut self) -> Self {
        self.fail_products = true;
        self
    }

    pub fn category_calls(&self) -> usize {
        *self.category_calls.lock().unwrap()
    }

    pub fn product_calls(&self) -> Vec<Option<String>> {
        self.product_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalogClient {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        *self.category_calls.lock().unwrap() += 1;
        if self.fail_categories {
            return Err(CatalogError::Rejected("categories unavailable".to_string()));
        }
        Ok(self.categories.clone())
    }

    async fn fetch_products(&self, category_id: Option<&str>) -> Result<Vec<ProductRecord>, CatalogError> {
        self.product_calls.lock().unwrap().push(category_id.map(str::to_string));
        if self.fail_products {
            return Err(CatalogError::Rejected("products unavailable".to_string()));
        }
        Ok(self
            .products
            .iter()
            .filter(|p| category_id.is_none_or(|id| p.category_id == id))
            .cloned()
            .collect())
    }
}

/// Catalog client whose products fetches block until the test releases
/// them, one by one, in any order. Categories answer immediately.
pub struct GatedCatalogClient {
    categories: Vec<CategoryRecord>,
    gates: Mutex<Vec<Option<oneshot::Sender<Vec<ProductRecord>>>>>,
}

impl GatedCatalogClient {
    pub fn new(categories: Vec<CategoryRecord>) -> Self {
        Self {
            categories,
            gates: Mutex::new(Vec::new()),
        }
    }

    /// Complete the `call`-th products fetch (0-based, in issue order)
    pub fn release_products(&self, call: usize, products: Vec<ProductRecord>) {
        let sender = self.gates.lock().unwrap()[call]
            .take()
            .expect("products fetch already released");
        let _ = sender.send(products);
    }

    pub fn pending_products(&self) -> usize {
        self.gates.lock().unwrap().iter().filter(|g| g.is_some()).count()
    }
}

#[async_trait]
impl CatalogClient for GatedCatalogClient {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        Ok(self.categories.clone())
    }

    async fn fetch_products(&self, _category_id: Option<&str>) -> Result<Vec<ProductRecord>, CatalogError> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(tx));
        rx.await
            .map_err(|_| CatalogError::Rejected("gate dropped".to_string()))
    }
}

/// Catalog client whose products fetches panic. Categories answer normally.
pub struct PanickingCatalogClient {
    categories: Vec<CategoryRecord>,
}

impl PanickingCatalogClient {
    pub fn new(categories: Vec<CategoryRecord>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl CatalogClient for PanickingCatalogClient {
    async fn fetch_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        Ok(self.categories.clone())
    }

    async fn fetch_products(&self, _category_id: Option<&str>) -> Result<Vec<ProductRecord>, CatalogError> {
        panic!("menu decoder blew up");
    }
}

/// Navigator that remembers every route it was given
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}
