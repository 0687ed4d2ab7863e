//! Typed real-time events.
//!
//! `InboundEvent` is what a connection may ask the core to do; `OutboundEvent`
//! is what the core fans out to subscribers. Wire encoding lives in
//! `infrastructure::dto`.

use super::{
    entity::{ChatMessage, CodeChange},
    value_object::{MemberId, RoomId},
};

/// Event received from a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    JoinRoom { room_id: RoomId, member_id: MemberId },
    LeaveRoom { room_id: RoomId, member_id: MemberId },
    CodeChange(CodeChange),
    ChatMessage { room_id: RoomId, message: ChatMessage },
    FileSystemChange { room_id: RoomId },
}

impl InboundEvent {
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::LeaveRoom { room_id, .. }
            | Self::ChatMessage { room_id, .. }
            | Self::FileSystemChange { room_id } => room_id,
            Self::CodeChange(change) => &change.room_id,
        }
    }

    /// Event name as it appears on the wire, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::CodeChange(_) => "code-change",
            Self::ChatMessage { .. } => "chat-message",
            Self::FileSystemChange { .. } => "file-system-change",
        }
    }
}

/// Event pushed to subscribers of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    PresenceUpdate { room_id: RoomId, members: Vec<MemberId> },
    CodeChange(CodeChange),
    ChatMessage { room_id: RoomId, message: ChatMessage },
    FileSystemChange { room_id: RoomId },
}

impl OutboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PresenceUpdate { .. } => "presence-update",
            Self::CodeChange(_) => "code-change",
            Self::ChatMessage { .. } => "chat-message",
            Self::FileSystemChange { .. } => "file-system-change",
        }
    }
}
