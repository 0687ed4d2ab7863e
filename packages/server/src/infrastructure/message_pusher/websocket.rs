//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `OutboundEvent` を JSON にエンコードし、接続の送信チャンネルへ積む
//!
//! ## 設計ノート
//!
//! WebSocket の生成と書き込みは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は UI 層が作った `UnboundedSender` を受け取り、イベントループの中から
//! 同期的に送信します。チャンネルは無制限なので送信でブロックすることはなく、
//! 1 本のチャンネルに積まれた順序がそのまま WebSocket への書き込み順になります。

use std::collections::HashMap;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundEvent, PusherChannel},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## フィールド
///
/// - `connections`: 接続中のコネクションと対応する送信チャンネルのマップ
#[derive(Default)]
pub struct WebSocketMessagePusher {
    connections: HashMap<ConnectionId, PusherChannel>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの接続数
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn encode(event: &OutboundEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }

    fn send_encoded(
        &self,
        connection_id: &ConnectionId,
        payload: String,
    ) -> Result<(), MessagePushError> {
        let Some(sender) = self.connections.get(connection_id) else {
            return Err(MessagePushError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            ));
        };
        sender
            .send(payload)
            .map_err(|_| MessagePushError::ChannelClosed(connection_id.as_str().to_string()))
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn register(&mut self, connection_id: ConnectionId, channel: PusherChannel) {
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        self.connections.insert(connection_id, channel);
    }

    fn unregister(&mut self, connection_id: &ConnectionId) {
        if self.connections.remove(connection_id).is_some() {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
        }
    }

    fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(event)?;
        self.send_encoded(connection_id, payload)?;
        tracing::debug!("Pushed '{}' to connection '{}'", event.kind(), connection_id);
        Ok(())
    }

    fn push_many(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError> {
        let payload = Self::encode(event)?;

        let mut delivered = 0;
        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match self.send_encoded(target, payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Skipping '{}' for connection '{}': {}", event.kind(), target, e),
            }
        }

        Ok(delivered)
    }
}
