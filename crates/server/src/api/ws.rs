//! WebSocket push of job events.
//!
//! Every event published on the transcriber's bus is forwarded to each
//! connected client as a JSON text frame. A client that falls behind the
//! live channel skips the dropped events; it can backfill them through
//! `GET /jobs/events?since=N`.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use transcriber_core::Event;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let rx = state.transcriber().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(forward_events(rx, sender));

    // Clients only read; drain until close
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client text message: {}", text.as_str());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

/// Pushes every received event into `sink` as a JSON text frame.
///
/// Returns when the sink rejects a frame or the event channel closes.
pub(crate) async fn forward_events<S>(mut rx: broadcast::Receiver<Event>, mut sink: S)
where
    S: Sink<Message> + Unpin,
{
    loop {
        match rx.recv().await {
            Ok(event) => {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        error!(seq = event.seq, "Failed to serialize event: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    debug!("WebSocket send failed, client disconnected");
                    break;
                }
                WS_MESSAGES_SENT
                    .with_label_values(&[event.event_type.as_str()])
                    .inc();
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("WebSocket client lagged, skipped {} events", n);
                WS_LAG_EVENTS.inc();
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Event channel closed");
                break;
            }
        }
    }
}
