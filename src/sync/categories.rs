// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use crate::catalog::{CategoryRecord, ALL_CATEGORY_ID};

/// Label of the synthetic unfiltered entry
pub const ALL_CATEGORY_NAME: &str = "All";

/// Entry of the filter bar shown above the product grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCategory {
    pub id: String,
    pub name: String,
}

impl FilterCategory {
    pub fn all() -> Self {
        Self {
            id: ALL_CATEGORY_ID.to_string(),
            name: ALL_CATEGORY_NAME.to_string(),
        }
    }
}

impl From<CategoryRecord> for FilterCategory {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

/// Build the filter list: "All" first, then active categories by
/// ascending `sort_order`. Equal sort orders keep fetch order.
pub fn normalize(records: Vec<CategoryRecord>) -> Vec<FilterCategory> {
    let mut active: Vec<CategoryRecord> = records.into_iter().filter(|r| r.active).collect();
    // sort_by_key is stable
    active.sort_by_key(|r| r.sort_order);

    std::iter::once(FilterCategory::all())
        .chain(active.into_iter().map(FilterCategory::from))
        .collect()
}
