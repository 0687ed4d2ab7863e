//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::CollaboratorError;

/// イベントループが既に停止している場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    #[error("realtime event loop has shut down")]
    Closed,
}

/// join-room がルームの存在確認で拒否された場合のエラー
#[derive(Debug, Error)]
pub enum JoinRejected {
    #[error("room '{0}' does not exist")]
    UnknownRoom(String),

    #[error("room directory unavailable: {0}")]
    Directory(#[from] CollaboratorError),
}
