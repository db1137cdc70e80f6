// SPDX-License-Identifier: GPL-3.0-only
/// Reasons a fetch did not update the screen. None of these reach the
/// view; the engine logs them and degrades.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    #[error("{resource} fetch failed: {reason}")]
    NetworkFailure { resource: Resource, reason: String },

    #[error("initial load incomplete: {failed} unavailable")]
    PartialDataFailure { failed: Resource },

    #[error("discarded stale {resource} response (tag {received}, current {current})")]
    StaleResponse {
        resource: Resource,
        received: u64,
        current: u64,
    },
}

/// The engine task is gone, usually because the screen unmounted
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("catalog engine has stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Categories,
    Products,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Categories => write!(f, "categories"),
            Resource::Products => write!(f, "products"),
        }
    }
}
