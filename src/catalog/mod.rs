// SPDX-License-Identifier: GPL-3.0-only
pub mod error;
pub mod http;
pub mod models;
pub mod traits;

pub use error::CatalogError;
pub use http::HttpCatalogClient;
pub use models::{CategoryRecord, ProductRecord};
pub use traits::{CatalogClient, ALL_CATEGORY_ID};
