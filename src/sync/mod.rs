// SPDX-License-Identifier: GPL-3.0-only
pub mod categories;
pub mod driver;
pub mod engine;
pub mod error;
pub mod state;

pub use driver::{spawn_catalog_engine, CatalogHandle};
pub use engine::CatalogSnapshot;
