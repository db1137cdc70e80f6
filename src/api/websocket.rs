// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Path;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use crate::api::handlers::ApiHandlers;
use crate::navigation::Route;
use crate::sync::CatalogSnapshot;

/// Commands a connected view may send
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum WsMessage {
    SelectCategory { id: String },
    SelectProduct { id: String },
    Refresh,
}

/// Events pushed to a connected view
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum WsEvent {
    Snapshot { snapshot: CatalogSnapshot },
    Navigate { route: Route },
    Error { message: String },
}

pub struct WebSocketServer {
    handlers: Arc<ApiHandlers>,
}

impl WebSocketServer {
    pub fn new(handlers: Arc<ApiHandlers>) -> Self {
        Self { handlers }
    }

    pub fn router(&self) -> Router {
        let handlers = self.handlers.clone();
        Router::new().route(
            "/ws",
            get(move |ws: WebSocketUpgrade| async move {
                ws.on_upgrade(move |socket| handle_socket(socket, handlers))
            }),
        )
    }
}

async fn handle_socket(socket: WebSocket, handlers: Arc<ApiHandlers>) {
    info!("View connected");
    let (sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut send_task = tokio::spawn(async move {
        let mut sender = sender;
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                error!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    let mut feed_task = tokio::spawn(feed_events(handlers.clone(), tx.clone()));

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) = handle_message(text, &handlers, &tx) {
                        error!(error = %e, "Failed to handle WebSocket message");
                    }
                }
                Message::Close(_) => {
                    info!("WebSocket connection closed");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            feed_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            feed_task.abort();
        }
        _ = (&mut feed_task) => {
            send_task.abort();
            recv_task.abort();
        }
    };
}

/// Push the current snapshot, then every later snapshot and route
async fn feed_events(handlers: Arc<ApiHandlers>, tx: mpsc::UnboundedSender<Message>) {
    let mut snapshots = handlers.subscribe();
    let mut routes = handlers.routes();

    let current = snapshots.borrow_and_update().clone();
    if send_event(&tx, &WsEvent::Snapshot { snapshot: current }).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("Catalog engine stopped, closing view feed");
                    break;
                }
                WsEvent::Snapshot { snapshot: snapshots.borrow_and_update().clone() }
            }
            route = routes.recv() => match route {
                Ok(route) => WsEvent::Navigate { route },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "View fell behind on navigation events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        if send_event(&tx, &event).is_err() {
            break;
        }
    }
}

fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &WsEvent) -> anyhow::Result<()> {
    tx.send(Message::Text(serde_json::to_string(event)?))?;
    Ok(())
}

fn handle_message(
    text: String,
    handlers: &ApiHandlers,
    tx: &mpsc::UnboundedSender<Message>,
) -> anyhow::Result<()> {
    let msg: WsMessage = match serde_json::from_str(&text) {
        Ok(m) => m,
        Err(e) => {
            let event = WsEvent::Error {
                message: format!("Invalid message format: {}", e),
            };
            return send_event(tx, &event);
        }
    };

    let failure = match msg {
        WsMessage::SelectCategory { id } => handlers
            .select_category(Path(id))
            .err()
            .map(|_| "Catalog engine is not running"),
        WsMessage::Refresh => handlers
            .refresh()
            .err()
            .map(|_| "Catalog engine is not running"),
        WsMessage::SelectProduct { id } => {
            // the route comes back through the feed
            handlers.select_product(&id);
            None
        }
    };

    if let Some(message) = failure {
        send_event(tx, &WsEvent::Error { message: message.to_string() })?;
    }
    Ok(())
}
