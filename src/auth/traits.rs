// SPDX-License-Identifier: GPL-3.0-only

/// Access to the identity provider's current bearer credential.
/// Acquisition and refresh stay on the provider's side.
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` when the user is signed out
    fn current_token(&self) -> Option<String>;
}
