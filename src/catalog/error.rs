// SPDX-License-Identifier: GPL-3.0-only
use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Catalog service rejected request: {0}")]
    Rejected(String),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Catalog fetch panicked")]
    Panicked,
}
