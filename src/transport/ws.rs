//! `/ws` endpoint: greeting on connect, inbound text rebroadcast to every client.

use crate::app::NotificationHub;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

pub const ADMIN_GREETING: &str = "Welcome to the Admin WebSocket server!";
pub const STOREFRONT_GREETING: &str = "Welcome to the Store WebSocket server!";

static CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
struct WsState {
    hub: NotificationHub,
    greeting: &'static str,
}

pub fn router(hub: NotificationHub, greeting: &'static str) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(WsState { hub, greeting })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let id = CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    info!(connection = id, "websocket client connected");

    let (mut sink, mut stream) = socket.split();
    let mut events = state.hub.subscribe();
    if sink
        .send(Message::Text(state.greeting.to_string()))
        .await
        .is_err()
    {
        info!(connection = id, "websocket client left before greeting");
        return;
    }

    let mut forward = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(connection = id, skipped, "websocket client lagging, messages dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let hub = state.hub.clone();
    let mut read = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    info!(connection = id, "received: {}", text);
                    hub.publish(text);
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(connection = id, "websocket error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut forward => read.abort(),
        _ = &mut read => forward.abort(),
    }
    info!(connection = id, "websocket client disconnected");
}
