//! UseCase: Session Lifecycle Manager
//!
//! 1 本の接続のライフタイム（接続 → join/leave → 切断）を管理します。
//! 切断時は `finalize` が、接続が購読していた全ルームに対して leave を合成し、
//! クライアントが自分で leave を送った場合と同じ後始末を行います。

use crate::domain::{ConnectionId, InboundEvent, MemberId, PusherChannel, RoomId, Session};

use super::{
    context::RealtimeContext,
    router::{DispatchOutcome, EventRouter},
};

pub struct SessionLifecycleManager {
    router: EventRouter,
}

impl SessionLifecycleManager {
    pub fn new(router: EventRouter) -> Self {
        Self { router }
    }

    /// Register a freshly upgraded connection.
    ///
    /// `member_id` is the identity verified during the handshake, if any.
    pub fn open(
        &self,
        ctx: &mut RealtimeContext,
        connection_id: ConnectionId,
        member_id: Option<MemberId>,
        channel: PusherChannel,
    ) {
        tracing::info!(
            "Connection '{}' opened (member: {})",
            connection_id,
            member_id.as_ref().map_or("<anonymous>", MemberId::as_str)
        );
        ctx.channels.attach(connection_id.clone(), channel);
        ctx.insert_session(Session::new(connection_id, member_id));
    }

    /// Track join/leave on the session and hand the event to the router.
    pub fn handle(
        &self,
        ctx: &mut RealtimeContext,
        connection_id: &ConnectionId,
        event: InboundEvent,
    ) -> DispatchOutcome {
        // An anonymous connection is owned by whoever it first joins as.
        if let InboundEvent::JoinRoom { member_id, .. } = &event
            && let Some(session) = ctx.session_mut(connection_id)
            && session.member_id.is_none()
        {
            session.member_id = Some(member_id.clone());
        }

        let tracked = match &event {
            InboundEvent::JoinRoom { room_id, .. } => Some((room_id.clone(), true)),
            InboundEvent::LeaveRoom { room_id, .. } => Some((room_id.clone(), false)),
            _ => None,
        };

        let outcome = self.router.dispatch(ctx, connection_id, event);

        if let Some((room_id, joined)) = tracked
            && !outcome.is_dropped()
            && let Some(session) = ctx.session_mut(connection_id)
        {
            if joined {
                session.record_join(&room_id);
            } else {
                session.record_leave(&room_id);
            }
        }

        outcome
    }

    /// Tear a connection down: leave every room it still holds, detach its
    /// channel and forget the session.
    ///
    /// Returns the rooms that were left. Unknown connections yield an empty list.
    pub fn finalize(&self, ctx: &mut RealtimeContext, connection_id: &ConnectionId) -> Vec<RoomId> {
        let Some(session) = ctx.session_mut(connection_id) else {
            tracing::debug!("Finalize for unknown connection '{}'", connection_id);
            return Vec::new();
        };

        let mut rooms = session.close();
        let member_id = session.member_id.clone();
        for room_id in ctx.channels.rooms_of(connection_id) {
            if !rooms.contains(&room_id) {
                rooms.push(room_id);
            }
        }

        if let Some(member_id) = member_id {
            for room_id in &rooms {
                self.router.dispatch(
                    ctx,
                    connection_id,
                    InboundEvent::LeaveRoom {
                        room_id: room_id.clone(),
                        member_id: member_id.clone(),
                    },
                );
            }
        }

        ctx.channels.detach(connection_id);
        ctx.remove_session(connection_id);

        tracing::info!(
            "Connection '{}' closed after leaving {} room(s)",
            connection_id,
            rooms.len()
        );
        rooms
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use codesync_shared::time::FixedClock;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{CodeChange, SessionState},
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::DropReason,
    };

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn member(id: &str) -> MemberId {
        MemberId::new(id.to_string()).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn setup() -> (SessionLifecycleManager, RealtimeContext) {
        let router = EventRouter::new(Arc::new(FixedClock::new(1)));
        let ctx = RealtimeContext::new(Box::new(WebSocketMessagePusher::new()));
        (SessionLifecycleManager::new(router), ctx)
    }

    fn open(
        manager: &SessionLifecycleManager,
        ctx: &mut RealtimeContext,
        connection: &str,
        owner: Option<&str>,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        manager.open(ctx, conn(connection), owner.map(member), tx);
        rx
    }

    fn join(room_id: &str, member_id: &str) -> InboundEvent {
        InboundEvent::JoinRoom {
            room_id: room(room_id),
            member_id: member(member_id),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
        let mut received = Vec::new();
        while let Ok(text) = rx.try_recv() {
            received.push(serde_json::from_str(&text).unwrap());
        }
        received
    }

    #[test]
    fn test_open_creates_connected_session() {
        // テスト項目: open で Connected 状態のセッションが作られる
        // given (前提条件):
        let (manager, mut ctx) = setup();

        // when (操作):
        let _rx = open(&manager, &mut ctx, "c1", Some("alice"));

        // then (期待する結果):
        let session = ctx.session(&conn("c1")).unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(ctx.member_of(&conn("c1")), Some(&member("alice")));
        assert_eq!(ctx.connection_count(), 1);
    }

    #[test]
    fn test_sequential_joins_keep_every_room() {
        // テスト項目: leave せずに 2 つのルームへ join すると両方に購読している
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let _rx = open(&manager, &mut ctx, "c1", Some("alice"));

        // when (操作):
        manager.handle(&mut ctx, &conn("c1"), join("A", "alice"));
        manager.handle(&mut ctx, &conn("c1"), join("B", "alice"));

        // then (期待する結果):
        assert_eq!(ctx.channels.rooms_of(&conn("c1")), vec![room("A"), room("B")]);
        assert_eq!(
            ctx.session(&conn("c1")).unwrap().state(),
            SessionState::Joined(vec![room("A"), room("B")])
        );
    }

    #[test]
    fn test_first_join_sets_owner_of_anonymous_connection() {
        // テスト項目: ハンドシェイクで名乗らなかった接続は最初の join のメンバーが所有者になる
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let _rx = open(&manager, &mut ctx, "c1", None);

        // when (操作):
        manager.handle(&mut ctx, &conn("c1"), join("R1", "alice"));
        let hijack = manager.handle(&mut ctx, &conn("c1"), join("R2", "mallory"));

        // then (期待する結果):
        assert_eq!(ctx.member_of(&conn("c1")), Some(&member("alice")));
        assert_eq!(hijack, DispatchOutcome::Dropped(DropReason::MemberMismatch));
        assert_eq!(ctx.session(&conn("c1")).unwrap().rooms(), &[room("R1")]);
    }

    #[test]
    fn test_leave_is_recorded_on_session() {
        // テスト項目: leave でセッションの参加ルームから外れる
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let _rx = open(&manager, &mut ctx, "c1", Some("alice"));
        manager.handle(&mut ctx, &conn("c1"), join("R1", "alice"));

        // when (操作):
        manager.handle(
            &mut ctx,
            &conn("c1"),
            InboundEvent::LeaveRoom {
                room_id: room("R1"),
                member_id: member("alice"),
            },
        );

        // then (期待する結果):
        assert_eq!(
            ctx.session(&conn("c1")).unwrap().state(),
            SessionState::Connected
        );
        assert!(ctx.presence.members(&room("R1")).is_empty());
    }

    #[test]
    fn test_finalize_leaves_every_room() {
        // テスト項目: 切断時に購読していた全ルーム（A, B）から名簿・購読ともに消える
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let _rx = open(&manager, &mut ctx, "c1", Some("alice"));
        manager.handle(&mut ctx, &conn("c1"), join("A", "alice"));
        manager.handle(&mut ctx, &conn("c1"), join("B", "alice"));

        // when (操作):
        let left = manager.finalize(&mut ctx, &conn("c1"));

        // then (期待する結果):
        assert_eq!(left, vec![room("A"), room("B")]);
        assert!(ctx.presence.members(&room("A")).is_empty());
        assert!(ctx.presence.members(&room("B")).is_empty());
        assert!(ctx.channels.rooms_of(&conn("c1")).is_empty());
        assert!(ctx.session(&conn("c1")).is_none());
        assert_eq!(ctx.presence.room_count(), 0);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        // テスト項目: 2 回目の finalize や未知の接続の finalize は何もしない
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let _rx = open(&manager, &mut ctx, "c1", Some("alice"));
        manager.handle(&mut ctx, &conn("c1"), join("R1", "alice"));
        manager.finalize(&mut ctx, &conn("c1"));

        // when (操作):
        let again = manager.finalize(&mut ctx, &conn("c1"));
        let unknown = manager.finalize(&mut ctx, &conn("ghost"));

        // then (期待する結果):
        assert!(again.is_empty());
        assert!(unknown.is_empty());
        assert_eq!(ctx.connection_count(), 0);
    }

    #[test]
    fn test_disconnect_scenario_between_two_members() {
        // テスト項目: C1(alice) と C2(bob) が R1 に居るとき、code-change は C2 だけに届き、
        //             C1 の切断後は C2 に ["bob"] の presence-update がちょうど 1 回届く
        // given (前提条件):
        let (manager, mut ctx) = setup();
        let mut rx1 = open(&manager, &mut ctx, "c1", Some("alice"));
        let mut rx2 = open(&manager, &mut ctx, "c2", Some("bob"));
        manager.handle(&mut ctx, &conn("c1"), join("R1", "alice"));
        manager.handle(&mut ctx, &conn("c2"), join("R1", "bob"));
        drain(&mut rx1);
        drain(&mut rx2);

        // when (操作):
        manager.handle(
            &mut ctx,
            &conn("c1"),
            InboundEvent::CodeChange(CodeChange {
                room_id: room("R1"),
                file_path: "main.js".to_string(),
                text: "console.log(1)".to_string(),
            }),
        );

        // then (期待する結果):
        assert!(drain(&mut rx1).is_empty());
        assert_eq!(
            drain(&mut rx2),
            vec![json!({
                "type": "code-change",
                "roomId": "R1",
                "filePath": "main.js",
                "text": "console.log(1)"
            })]
        );

        // when (操作):
        manager.finalize(&mut ctx, &conn("c1"));

        // then (期待する結果):
        assert_eq!(ctx.presence.members(&room("R1")), vec![member("bob")]);
        assert_eq!(
            drain(&mut rx2),
            vec![json!({"type": "presence-update", "roomId": "R1", "members": ["bob"]})]
        );
        assert!(drain(&mut rx1).is_empty());
    }
}
