//! WebSocket connection handlers.
//!
//! 接続ごとに 2 つのタスクが動きます。
//!
//! - recv タスク: クライアントからのフレームを `InboundEvent` に変換し、
//!   イベントループへ投入する（join はルーム存在確認を経由）
//! - pusher タスク: イベントループが積んだ送信用 JSON をソケットへ書き出す
//!
//! どちらかが終了したら、もう一方を止めて Disconnect をループへ送ります。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, InboundEvent, MemberId},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Member identity already verified by the auth layer
    pub member_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let member_id = match query.member_id {
        Some(raw) => match MemberId::new(raw.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Invalid member_id format: '{}'", raw);
                return Err(StatusCode::BAD_REQUEST);
            }
        },
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, member_id)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The loop ends when the socket refuses a write or when the event loop
/// drops the channel on disconnect.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Decode one text frame into a validated event.
///
/// Malformed JSON, unknown types and empty identifiers are dropped here with a
/// warning; the sender gets no response.
fn decode_frame(connection_id: &ConnectionId, text: &str) -> Option<InboundEvent> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Dropped malformed frame from '{}': {}", connection_id, e);
            return None;
        }
    };

    match InboundEvent::try_from(message) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Dropped invalid frame from '{}': {}", connection_id, e);
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, member_id: Option<MemberId>) {
    // Register only once the upgrade succeeded, so every registered
    // connection reaches the Disconnect below.
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state.handle.connect(connection_id.clone(), member_id, tx) {
        tracing::error!("Cannot accept connection '{}': {}", connection_id, e);
        return;
    }

    let (sender, mut receiver) = socket.split();

    let recv_state = Arc::clone(&state);
    let recv_connection_id = connection_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let Some(event) = decode_frame(&recv_connection_id, &text) else {
                        continue;
                    };

                    if let Err(e) = recv_state.admission.admit(&event).await {
                        tracing::warn!(
                            "Rejected '{}' for room '{}' from '{}': {}",
                            event.kind(),
                            event.room_id(),
                            recv_connection_id,
                            e
                        );
                        continue;
                    }

                    if recv_state
                        .handle
                        .submit(recv_connection_id.clone(), event)
                        .is_err()
                    {
                        tracing::error!("Event loop is gone; closing '{}'", recv_connection_id);
                        break;
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward outbound events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.handle.disconnect(connection_id.clone()) {
        tracing::warn!("Could not finalize '{}': {}", connection_id, e);
    }
}
