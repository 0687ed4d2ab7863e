//! MessagePusher trait 定義
//!
//! 接続ごとの送信チャンネルへイベントを届けるためのインターフェース。
//! エンコード方式（JSON over WebSocket など）は Infrastructure 層が決めます。
//!
//! イベントループから同期的に呼ばれるため、実装はブロックしてはいけません。

use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundEvent};

/// 接続ごとの送信チャンネル（エンコード済みテキストフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
pub trait MessagePusher: Send {
    /// 接続の送信チャンネルを登録
    fn register(&mut self, connection_id: ConnectionId, channel: PusherChannel);

    /// 接続の送信チャンネルを登録解除（未登録なら何もしない）
    fn unregister(&mut self, connection_id: &ConnectionId);

    /// 指定した接続へイベントを送信
    fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ同じイベントを送信
    ///
    /// エンコードは 1 回だけ行い、一部の接続への送信失敗は許容します。
    /// 戻り値は実際に届けられた接続数です。
    fn push_many(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError>;
}
