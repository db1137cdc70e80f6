// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category as returned by the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Inactive categories are never offered as filters
    pub active: bool,

    /// Ascending display position
    #[serde(default)]
    pub sort_order: i64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CategoryRecord {
    pub fn new(id: &str, name: &str, active: bool, sort_order: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            active,
            sort_order,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Menu item as returned by the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Unit price, sent as a JSON number by the service
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub category_id: String,

    /// Unavailable items must never reach the view
    pub available: bool,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    pub fn new(id: &str, name: &str, category_id: &str, price: Decimal, available: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price,
            category_id: category_id.to_string(),
            available,
            image_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}
