//! Presence Store
//!
//! ルームごとに「いま居るメンバー」を参加順で保持する、リアルタイム層の
//! 唯一の正となるデータ。すべての操作は同期的かつインメモリで完結します。

use std::collections::HashMap;

use super::{MemberId, RoomId};

/// Result of a presence mutation.
///
/// `changed` tells the caller whether the roster has to be re-broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub room_id: RoomId,
    pub members: Vec<MemberId>,
    pub changed: bool,
}

/// Room → insertion-ordered member set.
#[derive(Debug, Default)]
pub struct PresenceStore {
    rooms: HashMap<RoomId, Vec<MemberId>>,
}

impl PresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a room. Adding a member twice is a no-op.
    pub fn add_member(&mut self, room_id: &RoomId, member_id: &MemberId) -> PresenceChange {
        let members = self.rooms.entry(room_id.clone()).or_default();
        let changed = if members.contains(member_id) {
            false
        } else {
            members.push(member_id.clone());
            true
        };

        PresenceChange {
            room_id: room_id.clone(),
            members: members.clone(),
            changed,
        }
    }

    /// Remove a member from a room. Removing an absent member is a no-op.
    ///
    /// A room whose roster becomes empty is dropped from the store.
    pub fn remove_member(&mut self, room_id: &RoomId, member_id: &MemberId) -> PresenceChange {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return PresenceChange {
                room_id: room_id.clone(),
                members: Vec::new(),
                changed: false,
            };
        };

        let before = members.len();
        members.retain(|member| member != member_id);
        let changed = members.len() != before;
        let remaining = members.clone();

        if remaining.is_empty() {
            self.rooms.remove(room_id);
        }

        PresenceChange {
            room_id: room_id.clone(),
            members: remaining,
            changed,
        }
    }

    /// Current roster of a room; empty for an unknown room.
    pub fn members(&self, room_id: &RoomId) -> Vec<MemberId> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId, member_id: &MemberId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(member_id))
    }

    /// Number of rooms with at least one present member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - add_member / remove_member の冪等性
    // - 参加順が保持されること
    // - 未知のルームに対する問い合わせがエラーにならないこと
    //
    // 【なぜこのテストが必要か】
    // - presence-update のブロードキャスト要否は `changed` で判断される
    // - 重複 join や欠落した leave があっても名簿が壊れないことを保証する
    // ========================================

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn member(id: &str) -> MemberId {
        MemberId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_add_member_twice_keeps_single_entry() {
        // テスト項目: 同じメンバーを 2 回追加しても 1 件だけ保持される
        // given (前提条件):
        let mut store = PresenceStore::new();

        // when (操作):
        let first = store.add_member(&room("R1"), &member("alice"));
        let second = store.add_member(&room("R1"), &member("alice"));

        // then (期待する結果):
        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(second.members, vec![member("alice")]);
        assert_eq!(store.members(&room("R1")), vec![member("alice")]);
    }

    #[test]
    fn test_members_keep_insertion_order() {
        // テスト項目: 名簿は参加した順に並ぶ
        // given (前提条件):
        let mut store = PresenceStore::new();

        // when (操作):
        store.add_member(&room("R1"), &member("charlie"));
        store.add_member(&room("R1"), &member("alice"));
        store.add_member(&room("R1"), &member("bob"));

        // then (期待する結果):
        assert_eq!(
            store.members(&room("R1")),
            vec![member("charlie"), member("alice"), member("bob")]
        );
    }

    #[test]
    fn test_remove_member_is_idempotent() {
        // テスト項目: 存在しないメンバーの削除は変更なしとして扱われる
        // given (前提条件):
        let mut store = PresenceStore::new();
        store.add_member(&room("R1"), &member("alice"));
        store.add_member(&room("R1"), &member("bob"));

        // when (操作):
        let removed = store.remove_member(&room("R1"), &member("alice"));
        let again = store.remove_member(&room("R1"), &member("alice"));

        // then (期待する結果):
        assert!(removed.changed);
        assert!(!again.changed);
        assert_eq!(again.members, vec![member("bob")]);
    }

    #[test]
    fn test_unknown_room_has_no_members() {
        // テスト項目: 未知のルームは空の名簿を返し、削除もエラーにならない
        // given (前提条件):
        let mut store = PresenceStore::new();

        // when (操作):
        let members = store.members(&room("nowhere"));
        let change = store.remove_member(&room("nowhere"), &member("alice"));

        // then (期待する結果):
        assert!(members.is_empty());
        assert!(!change.changed);
        assert!(change.members.is_empty());
    }

    #[test]
    fn test_empty_room_is_dropped() {
        // テスト項目: 最後のメンバーが抜けたルームはストアから消える
        // given (前提条件):
        let mut store = PresenceStore::new();
        store.add_member(&room("R1"), &member("alice"));
        store.add_member(&room("R2"), &member("bob"));

        // when (操作):
        store.remove_member(&room("R1"), &member("alice"));

        // then (期待する結果):
        assert_eq!(store.room_count(), 1);
        assert!(!store.contains(&room("R1"), &member("alice")));
        assert!(store.contains(&room("R2"), &member("bob")));
    }
}
