// SPDX-License-Identifier: GPL-3.0-only
use std::fmt;
use serde::{Deserialize, Serialize};

/// Screens reachable from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "id")]
pub enum Route {
    ProductDetail(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::ProductDetail(id) => write!(f, "/product/{}", id),
        }
    }
}

/// Handoff to whatever owns screen navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
