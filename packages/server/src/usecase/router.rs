//! UseCase: Event Router
//!
//! 受信したリアルタイムイベントを種類ごとに処理し、Presence Store と
//! Room Channel Registry を更新したうえで、適切な接続群へファンアウトします。
//!
//! | イベント              | 状態の更新                     | 配信先                     |
//! |-----------------------|--------------------------------|----------------------------|
//! | join-room             | 購読 + 名簿へ追加              | ルーム全員（名簿が変化時） |
//! | leave-room            | 購読解除 + 名簿から削除        | 残りの購読者（変化時）     |
//! | code-change           | なし（保存ワーカーへ委譲）     | 送信者以外                 |
//! | chat-message          | なし（タイムスタンプを付与）   | 送信者を含む全員           |
//! | file-system-change    | なし                           | 送信者を含む全員           |

use std::sync::Arc;

use codesync_shared::time::Clock;

use crate::domain::{
    ChatMessage, CodeChange, ConnectionId, FileService, InboundEvent, MemberId, OutboundEvent,
    RoomId,
};

use super::{context::RealtimeContext, persistence::SaveQueue};

/// Why an inbound event was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The connection is not (or no longer) known to the core
    UnknownConnection,
    /// The event names a member other than the connection's owner
    MemberMismatch,
}

/// What a dispatch did, so that callers and tests can observe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// join / leave: whether the roster changed and how many connections
    /// received a presence update
    Presence {
        room_id: RoomId,
        changed: bool,
        notified: usize,
    },
    /// code-change / chat-message / file-system-change relayed to `delivered`
    /// connections
    Relayed { room_id: RoomId, delivered: usize },
    Dropped(DropReason),
}

impl DispatchOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

pub struct EventRouter {
    saves: Option<SaveQueue>,
    clock: Arc<dyn Clock>,
}

impl EventRouter {
    /// Relay-only router: code changes are fanned out but never persisted.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { saves: None, clock }
    }

    /// Persist relayed buffers through `file_service`.
    ///
    /// Starts the save worker, so this must be called inside a tokio runtime.
    pub fn with_file_service(mut self, file_service: Arc<dyn FileService>) -> Self {
        self.saves = Some(SaveQueue::spawn(file_service));
        self
    }

    /// Process one inbound event on behalf of `connection_id`.
    pub fn dispatch(
        &self,
        ctx: &mut RealtimeContext,
        connection_id: &ConnectionId,
        event: InboundEvent,
    ) -> DispatchOutcome {
        let Some(session) = ctx.session(connection_id) else {
            tracing::warn!(
                "Dropped '{}' from unknown connection '{}'",
                event.kind(),
                connection_id
            );
            return DispatchOutcome::Dropped(DropReason::UnknownConnection);
        };

        if let InboundEvent::JoinRoom { member_id, .. } | InboundEvent::LeaveRoom { member_id, .. } =
            &event
            && let Some(owner) = &session.member_id
            && owner != member_id
        {
            tracing::warn!(
                "Dropped '{}' for member '{}' on connection '{}' owned by '{}'",
                event.kind(),
                member_id,
                connection_id,
                owner
            );
            return DispatchOutcome::Dropped(DropReason::MemberMismatch);
        }

        match event {
            InboundEvent::JoinRoom { room_id, member_id } => {
                self.join(ctx, connection_id, room_id, member_id)
            }
            InboundEvent::LeaveRoom { room_id, member_id } => {
                self.leave(ctx, connection_id, room_id, member_id)
            }
            InboundEvent::CodeChange(change) => self.code_change(ctx, connection_id, change),
            InboundEvent::ChatMessage { room_id, message } => {
                self.chat_message(ctx, room_id, message)
            }
            InboundEvent::FileSystemChange { room_id } => self.file_system_change(ctx, room_id),
        }
    }

    fn join(
        &self,
        ctx: &mut RealtimeContext,
        connection_id: &ConnectionId,
        room_id: RoomId,
        member_id: MemberId,
    ) -> DispatchOutcome {
        let subscribed = ctx.channels.subscribe(connection_id, &room_id);
        let change = ctx.presence.add_member(&room_id, &member_id);

        let update = OutboundEvent::PresenceUpdate {
            room_id: room_id.clone(),
            members: change.members,
        };
        let notified = if change.changed {
            tracing::info!("Member '{}' joined room '{}'", member_id, room_id);
            ctx.channels.broadcast_all(&room_id, &update)
        } else if subscribed {
            // Another connection of the same member is already present; the
            // new connection still needs the current roster.
            usize::from(ctx.channels.push_to(connection_id, &update))
        } else {
            0
        };

        DispatchOutcome::Presence {
            room_id,
            changed: change.changed,
            notified,
        }
    }

    fn leave(
        &self,
        ctx: &mut RealtimeContext,
        connection_id: &ConnectionId,
        room_id: RoomId,
        member_id: MemberId,
    ) -> DispatchOutcome {
        ctx.channels.unsubscribe(connection_id, &room_id);

        if ctx.member_still_subscribed(&room_id, &member_id) {
            tracing::debug!(
                "Member '{}' still has a connection in room '{}'",
                member_id,
                room_id
            );
            return DispatchOutcome::Presence {
                room_id,
                changed: false,
                notified: 0,
            };
        }

        let change = ctx.presence.remove_member(&room_id, &member_id);
        let notified = if change.changed {
            tracing::info!("Member '{}' left room '{}'", member_id, room_id);
            let update = OutboundEvent::PresenceUpdate {
                room_id: room_id.clone(),
                members: change.members,
            };
            ctx.channels.broadcast_all(&room_id, &update)
        } else {
            0
        };

        DispatchOutcome::Presence {
            room_id,
            changed: change.changed,
            notified,
        }
    }

    fn code_change(
        &self,
        ctx: &RealtimeContext,
        connection_id: &ConnectionId,
        change: CodeChange,
    ) -> DispatchOutcome {
        let room_id = change.room_id.clone();
        let delivered = ctx.channels.broadcast(
            &room_id,
            &OutboundEvent::CodeChange(change.clone()),
            Some(connection_id),
        );

        if let Some(saves) = &self.saves {
            saves.enqueue(change);
        }

        DispatchOutcome::Relayed { room_id, delivered }
    }

    fn chat_message(
        &self,
        ctx: &RealtimeContext,
        room_id: RoomId,
        message: ChatMessage,
    ) -> DispatchOutcome {
        let message = message.stamped_at(self.clock.now_millis());
        let delivered = ctx.channels.broadcast_all(
            &room_id,
            &OutboundEvent::ChatMessage {
                room_id: room_id.clone(),
                message,
            },
        );
        DispatchOutcome::Relayed { room_id, delivered }
    }

    fn file_system_change(&self, ctx: &RealtimeContext, room_id: RoomId) -> DispatchOutcome {
        let delivered = ctx.channels.broadcast_all(
            &room_id,
            &OutboundEvent::FileSystemChange {
                room_id: room_id.clone(),
            },
        );
        DispatchOutcome::Relayed { room_id, delivered }
    }
}
