//! UseCase: join-room の受け入れ判定
//!
//! Room Directory への問い合わせは非同期の外部呼び出しなので、イベントループ
//! ではなく接続ごとのトランスポートタスクで、join をループへ投入する前に行います。

use std::sync::Arc;

use crate::domain::{InboundEvent, RoomDirectory};

use super::error::JoinRejected;

#[derive(Clone)]
pub struct JoinAdmission {
    directory: Arc<dyn RoomDirectory>,
}

impl JoinAdmission {
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// Check whether an inbound event may be submitted to the event loop.
    ///
    /// Only `join-room` is checked; every other event passes through.
    pub async fn admit(&self, event: &InboundEvent) -> Result<(), JoinRejected> {
        let InboundEvent::JoinRoom { room_id, .. } = event else {
            return Ok(());
        };

        if self.directory.room_exists(room_id).await? {
            Ok(())
        } else {
            Err(JoinRejected::UnknownRoom(room_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollaboratorError, MemberId, MockRoomDirectory, RoomId};

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn join(room_id: &str) -> InboundEvent {
        InboundEvent::JoinRoom {
            room_id: room(room_id),
            member_id: MemberId::new("alice".to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_admit_known_room() {
        // テスト項目: 存在するルームへの join は受け入れられる
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_room_exists()
            .withf(|room_id| room_id.as_str() == "R1")
            .times(1)
            .returning(|_| Ok(true));
        let admission = JoinAdmission::new(Arc::new(directory));

        // when (操作):
        let result = admission.admit(&join("R1")).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reject_unknown_room() {
        // テスト項目: 存在しないルームへの join は UnknownRoom で拒否される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_room_exists().returning(|_| Ok(false));
        let admission = JoinAdmission::new(Arc::new(directory));

        // when (操作):
        let result = admission.admit(&join("nowhere")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRejected::UnknownRoom(room)) if room == "nowhere"));
    }

    #[tokio::test]
    async fn test_directory_failure_rejects_join() {
        // テスト項目: Room Directory の障害時は join を拒否する
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_room_exists()
            .returning(|_| Err(CollaboratorError::Io(std::io::Error::other("unreachable"))));
        let admission = JoinAdmission::new(Arc::new(directory));

        // when (操作):
        let result = admission.admit(&join("R1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRejected::Directory(_))));
    }

    #[tokio::test]
    async fn test_other_events_skip_directory() {
        // テスト項目: join 以外のイベントは Room Directory に問い合わせない
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_room_exists().never();
        let admission = JoinAdmission::new(Arc::new(directory));

        // when (操作):
        let result = admission
            .admit(&InboundEvent::FileSystemChange { room_id: room("R1") })
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
