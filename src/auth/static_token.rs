// SPDX-License-Identifier: GPL-3.0-only
use crate::auth::traits::TokenProvider;

/// Token handed over by the identity provider out of band (config, env)
#[derive(Debug, Clone, Default)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

impl TokenProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }
}
