//! Value Object 定義
//!
//! リアルタイム層で扱う識別子はすべて「空でない文字列」として表現します。
//! 中身の意味（ルームが実在するか、ユーザーが認証済みか）は外部コラボレーター
//! の責務であり、ここでは検証しません。

use std::fmt;

use uuid::Uuid;

use super::error::DomainError;

fn non_empty(value: String, field: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyIdentifier(field));
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

/// ルーム識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// 前後の空白を取り除いた上で、空でなければ RoomId を生成
    pub fn new(value: String) -> Result<Self, DomainError> {
        non_empty(value, "roomId").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// メンバー識別子（認証済みユーザー ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        non_empty(value, "memberId").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 1 本のリアルタイム接続の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// UUID v4 から新しい ConnectionId を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, DomainError> {
        non_empty(value, "connectionId").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_conversions {
    ($($ty:ident),+) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = DomainError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl TryFrom<&str> for $ty {
                type Error = DomainError;

                fn try_from(value: &str) -> Result<Self, Self::Error> {
                    Self::new(value.to_string())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

impl_string_conversions!(RoomId, MemberId, ConnectionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rejects_blank_value() {
        // テスト項目: 空白のみの RoomId は生成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = RoomId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyIdentifier("roomId")));
    }

    #[test]
    fn test_member_id_is_trimmed() {
        // テスト項目: MemberId の前後の空白は取り除かれる
        // given (前提条件):
        let value = "  alice ".to_string();

        // when (操作):
        let member = MemberId::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(member.as_str(), "alice");
    }

    #[test]
    fn test_generated_connection_ids_are_unique() {
        // テスト項目: 採番された ConnectionId は重複しない
        // given (前提条件):

        // when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn test_try_from_str_validates() {
        // テスト項目: TryFrom<&str> でも空文字列は拒否される
        // given (前提条件):
        let valid = "R1";
        let invalid = "";

        // when (操作):
        let ok = RoomId::try_from(valid);
        let err = MemberId::try_from(invalid);

        // then (期待する結果):
        assert_eq!(ok.unwrap().to_string(), "R1");
        assert_eq!(err, Err(DomainError::EmptyIdentifier("memberId")));
    }
}
