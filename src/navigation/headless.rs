// SPDX-License-Identifier: GPL-3.0-only
use tokio::sync::broadcast;
use tracing::info;
use crate::navigation::traits::{Navigator, Route};

/// Navigator for headless runs: logs each route and rebroadcasts it
/// to connected views
pub struct LogNavigator {
    routes: broadcast::Sender<Route>,
}

impl LogNavigator {
    pub fn new() -> Self {
        let (routes, _) = broadcast::channel(16);
        Self { routes }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Route> {
        self.routes.subscribe()
    }
}

impl Default for LogNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigating");
        // No receivers just means no view is listening
        let _ = self.routes.send(route);
    }
}
