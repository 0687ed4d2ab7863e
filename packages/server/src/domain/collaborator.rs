//! 外部コラボレーターの trait 定義
//!
//! リアルタイム層が必要とする外部サービスへのインターフェースをドメイン層自身が
//! 定義し、具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `RoomDirectory`: ルームの存在確認（REST 層のルーム管理が正）
//! - `FileService`: ファイル内容の永続化（リアルタイム層はファイルを読み書きしない）

use async_trait::async_trait;

use super::{CollaboratorError, RoomId};

/// Room existence decisions, owned by the room-management service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Whether real-time sessions may join `room_id`.
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, CollaboratorError>;
}

/// File content persistence, owned by the file service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileService: Send + Sync {
    /// Persist the full text of one file of a room.
    async fn save_file(
        &self,
        room_id: &RoomId,
        file_path: &str,
        text: &str,
    ) -> Result<(), CollaboratorError>;
}
