//! Realtime Context
//!
//! Presence Store / Room Channel Registry / セッション表をひとまとめにした、
//! プロセスに 1 つだけ存在するコンテキスト。グローバル変数は使わず、
//! イベントループが所有して `&mut` で EventRouter と SessionLifecycleManager
//! に渡します。

use std::collections::HashMap;

use crate::domain::{
    ConnectionId, MemberId, MessagePusher, PresenceStore, RoomChannelRegistry, RoomId, Session,
};

/// Read-only view of one room, served to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub room_id: RoomId,
    pub members: Vec<MemberId>,
    pub subscribers: usize,
}

pub struct RealtimeContext {
    pub presence: PresenceStore,
    pub channels: RoomChannelRegistry,
    sessions: HashMap<ConnectionId, Session>,
}

impl RealtimeContext {
    pub fn new(pusher: Box<dyn MessagePusher>) -> Self {
        Self {
            presence: PresenceStore::new(),
            channels: RoomChannelRegistry::new(pusher),
            sessions: HashMap::new(),
        }
    }

    pub fn session(&self, connection_id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection_id)
    }

    pub(crate) fn session_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(connection_id)
    }

    pub(crate) fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.connection_id.clone(), session);
    }

    pub(crate) fn remove_session(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        self.sessions.remove(connection_id)
    }

    /// Owning member of a live connection, if known.
    pub fn member_of(&self, connection_id: &ConnectionId) -> Option<&MemberId> {
        self.sessions
            .get(connection_id)
            .and_then(|session| session.member_id.as_ref())
    }

    /// Whether any connection still subscribed to `room_id` belongs to `member_id`.
    pub fn member_still_subscribed(&self, room_id: &RoomId, member_id: &MemberId) -> bool {
        self.channels
            .subscribers(room_id)
            .iter()
            .any(|connection_id| self.member_of(connection_id) == Some(member_id))
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn snapshot(&self, room_id: &RoomId) -> PresenceSnapshot {
        PresenceSnapshot {
            room_id: room_id.clone(),
            members: self.presence.members(room_id),
            subscribers: self.channels.subscribers(room_id).len(),
        }
    }
}
