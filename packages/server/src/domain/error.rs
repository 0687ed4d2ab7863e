//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("file path '{0}' is not a relative path inside the room")]
    InvalidFilePath(String),
}

/// 接続へのメッセージ送信に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が登録されていない
    #[error("connection '{0}' is not attached")]
    ConnectionNotFound(String),

    /// チャンネルが閉じている（切断済み）
    #[error("failed to push to connection '{0}': channel closed")]
    ChannelClosed(String),

    /// イベントのエンコードに失敗
    #[error("failed to encode outbound event: {0}")]
    Encode(String),
}

/// 外部コラボレーター（Room Directory / File Service）のエラー
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error(transparent)]
    InvalidPath(#[from] DomainError),

    #[error("file service I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
