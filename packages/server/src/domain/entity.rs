//! Entity 定義
//!
//! - `ChatMessage`: ルーム内で一時的に配信されるチャットメッセージ（永続化しない）
//! - `CodeChange`: エディタバッファ全体の置き換え（last-write-wins）
//! - `Session`: 1 本の接続のライフタイム

use super::value_object::{ConnectionId, MemberId, RoomId};

/// Chat message relayed to every subscriber of a room, sender included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender_id: MemberId,
    pub sender_name: String,
    pub text: String,
    /// Unix timestamp in milliseconds; `0` means "not stamped yet"
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn is_stamped(&self) -> bool {
        self.timestamp > 0
    }

    /// Fill in the timestamp if the client did not provide one.
    pub fn stamped_at(mut self, now_millis: i64) -> Self {
        if !self.is_stamped() {
            self.timestamp = now_millis;
        }
        self
    }
}

/// Whole-document replacement for one file of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChange {
    pub room_id: RoomId,
    pub file_path: String,
    pub text: String,
}

/// Derived lifecycle state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Joined(Vec<RoomId>),
    Disconnected,
}

/// One live connection and the rooms it has joined.
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: ConnectionId,
    /// Owning member, known from the handshake or from the first join
    pub member_id: Option<MemberId>,
    rooms: Vec<RoomId>,
    closed: bool,
}

impl Session {
    pub fn new(connection_id: ConnectionId, member_id: Option<MemberId>) -> Self {
        Self {
            connection_id,
            member_id,
            rooms: Vec::new(),
            closed: false,
        }
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Record a joined room. Returns `false` if it was already recorded.
    pub fn record_join(&mut self, room_id: &RoomId) -> bool {
        if self.rooms.contains(room_id) {
            return false;
        }
        self.rooms.push(room_id.clone());
        true
    }

    /// Forget a room. Returns `false` if the session never joined it.
    pub fn record_leave(&mut self, room_id: &RoomId) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|room| room != room_id);
        self.rooms.len() != before
    }

    /// Mark the session as torn down and hand back the rooms it still held.
    pub fn close(&mut self) -> Vec<RoomId> {
        self.closed = true;
        std::mem::take(&mut self.rooms)
    }

    pub fn state(&self) -> SessionState {
        if self.closed {
            SessionState::Disconnected
        } else if self.rooms.is_empty() {
            SessionState::Connected
        } else {
            SessionState::Joined(self.rooms.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn new_session() -> Session {
        Session::new(
            ConnectionId::new("c1".to_string()).unwrap(),
            Some(MemberId::new("alice".to_string()).unwrap()),
        )
    }

    #[test]
    fn test_session_state_transitions() {
        // テスト項目: Connected → Joined(A) → Joined(B) → Disconnected と遷移する
        // given (前提条件):
        let mut session = new_session();
        assert_eq!(session.state(), SessionState::Connected);

        // when (操作):
        session.record_join(&room("A"));
        let joined_a = session.state();
        session.record_leave(&room("A"));
        session.record_join(&room("B"));
        let joined_b = session.state();
        let held = session.close();

        // then (期待する結果):
        assert_eq!(joined_a, SessionState::Joined(vec![room("A")]));
        assert_eq!(joined_b, SessionState::Joined(vec![room("B")]));
        assert_eq!(held, vec![room("B")]);
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_session_keeps_multiple_rooms_in_join_order() {
        // テスト項目: leave を挟まない複数回の join はすべて保持される
        // given (前提条件):
        let mut session = new_session();

        // when (操作):
        let first = session.record_join(&room("A"));
        let second = session.record_join(&room("B"));
        let duplicate = session.record_join(&room("A"));

        // then (期待する結果):
        assert!(first && second);
        assert!(!duplicate);
        assert_eq!(session.rooms(), &[room("A"), room("B")]);
    }

    #[test]
    fn test_record_leave_of_unknown_room_is_noop() {
        // テスト項目: join していないルームの leave は何もしない
        // given (前提条件):
        let mut session = new_session();
        session.record_join(&room("A"));

        // when (操作):
        let removed = session.record_leave(&room("Z"));

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(session.rooms(), &[room("A")]);
    }

    #[test]
    fn test_chat_message_is_stamped_only_once() {
        // テスト項目: クライアントが付けた timestamp は上書きされない
        // given (前提条件):
        let unstamped = ChatMessage {
            sender_id: MemberId::new("alice".to_string()).unwrap(),
            sender_name: "Alice".to_string(),
            text: "hi".to_string(),
            timestamp: 0,
        };
        let stamped = ChatMessage {
            timestamp: 1000,
            ..unstamped.clone()
        };

        // when (操作):
        let filled = unstamped.stamped_at(5000);
        let kept = stamped.stamped_at(5000);

        // then (期待する結果):
        assert_eq!(filled.timestamp, 5000);
        assert_eq!(kept.timestamp, 1000);
    }
}
