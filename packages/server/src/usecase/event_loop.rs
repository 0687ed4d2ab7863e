//! UseCase: リアルタイムイベントループ
//!
//! `RealtimeContext` を所有する単一の tokio タスク。すべての接続からの
//! コマンドは 1 本の mpsc チャンネルに到着順で積まれ、1 件ずつ処理されます。
//! そのためコア状態にロックは不要で、接続ごとのイベント順序も保たれます。

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{ConnectionId, InboundEvent, MemberId, PusherChannel, RoomId};

use super::{
    context::{PresenceSnapshot, RealtimeContext},
    error::LoopError,
    session::SessionLifecycleManager,
};

/// Work item for the event loop.
#[derive(Debug)]
pub enum LoopCommand {
    Connect {
        connection_id: ConnectionId,
        member_id: Option<MemberId>,
        channel: PusherChannel,
    },
    Inbound {
        connection_id: ConnectionId,
        event: InboundEvent,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Snapshot {
        room_id: RoomId,
        reply: oneshot::Sender<PresenceSnapshot>,
    },
}

/// Cloneable entry point into the event loop, shared by transport tasks.
#[derive(Debug, Clone)]
pub struct RealtimeHandle {
    tx: mpsc::UnboundedSender<LoopCommand>,
}

impl RealtimeHandle {
    pub fn connect(
        &self,
        connection_id: ConnectionId,
        member_id: Option<MemberId>,
        channel: PusherChannel,
    ) -> Result<(), LoopError> {
        self.send(LoopCommand::Connect {
            connection_id,
            member_id,
            channel,
        })
    }

    pub fn submit(&self, connection_id: ConnectionId, event: InboundEvent) -> Result<(), LoopError> {
        self.send(LoopCommand::Inbound {
            connection_id,
            event,
        })
    }

    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<(), LoopError> {
        self.send(LoopCommand::Disconnect { connection_id })
    }

    /// Ask the loop for a read-only view of one room.
    pub async fn snapshot(&self, room_id: RoomId) -> Result<PresenceSnapshot, LoopError> {
        let (reply, rx) = oneshot::channel();
        self.send(LoopCommand::Snapshot { room_id, reply })?;
        rx.await.map_err(|_| LoopError::Closed)
    }

    fn send(&self, command: LoopCommand) -> Result<(), LoopError> {
        self.tx.send(command).map_err(|_| LoopError::Closed)
    }
}

/// Start the event loop on the current tokio runtime.
///
/// The loop stops once every `RealtimeHandle` has been dropped and hands the
/// context back through the join handle.
pub fn spawn_event_loop(
    ctx: RealtimeContext,
    manager: SessionLifecycleManager,
) -> (RealtimeHandle, JoinHandle<RealtimeContext>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_event_loop(ctx, manager, rx));
    (RealtimeHandle { tx }, task)
}

async fn run_event_loop(
    mut ctx: RealtimeContext,
    manager: SessionLifecycleManager,
    mut rx: mpsc::UnboundedReceiver<LoopCommand>,
) -> RealtimeContext {
    tracing::debug!("Realtime event loop started");

    while let Some(command) = rx.recv().await {
        match command {
            LoopCommand::Connect {
                connection_id,
                member_id,
                channel,
            } => manager.open(&mut ctx, connection_id, member_id, channel),
            LoopCommand::Inbound {
                connection_id,
                event,
            } => {
                let kind = event.kind();
                let outcome = manager.handle(&mut ctx, &connection_id, event);
                tracing::debug!("'{}' from '{}': {:?}", kind, connection_id, outcome);
            }
            LoopCommand::Disconnect { connection_id } => {
                manager.finalize(&mut ctx, &connection_id);
            }
            LoopCommand::Snapshot { room_id, reply } => {
                // The requester may have given up waiting.
                let _ = reply.send(ctx.snapshot(&room_id));
            }
        }
    }

    tracing::debug!("Realtime event loop stopped");
    ctx
}
