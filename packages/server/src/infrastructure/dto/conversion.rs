//! Conversion logic between DTOs and domain types.
//!
//! Client frames are validated here: a frame that fails conversion is a
//! protocol error and is dropped by the transport.

use crate::domain::{
    ChatMessage, CodeChange, DomainError, InboundEvent, MemberId, OutboundEvent, RoomId,
};
use crate::infrastructure::dto::{
    http::PresenceSnapshotDto,
    websocket::{ChatMessageDto, ClientMessage, ServerMessage},
};
use crate::usecase::PresenceSnapshot;

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<ChatMessageDto> for ChatMessage {
    type Error = DomainError;

    fn try_from(dto: ChatMessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            sender_id: MemberId::new(dto.sender_id)?,
            sender_name: dto.sender_name,
            text: dto.text,
            timestamp: dto.timestamp,
        })
    }
}

impl TryFrom<ClientMessage> for InboundEvent {
    type Error = DomainError;

    fn try_from(dto: ClientMessage) -> Result<Self, Self::Error> {
        let event = match dto {
            ClientMessage::JoinRoom { room_id, member_id } => Self::JoinRoom {
                room_id: RoomId::new(room_id)?,
                member_id: MemberId::new(member_id)?,
            },
            ClientMessage::LeaveRoom { room_id, member_id } => Self::LeaveRoom {
                room_id: RoomId::new(room_id)?,
                member_id: MemberId::new(member_id)?,
            },
            ClientMessage::CodeChange {
                room_id,
                file_path,
                text,
            } => Self::CodeChange(CodeChange {
                room_id: RoomId::new(room_id)?,
                file_path,
                text,
            }),
            ClientMessage::ChatMessage { room_id, message } => Self::ChatMessage {
                room_id: RoomId::new(room_id)?,
                message: message.try_into()?,
            },
            ClientMessage::FileSystemChange { room_id } => Self::FileSystemChange {
                room_id: RoomId::new(room_id)?,
            },
        };
        Ok(event)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender_id: message.sender_id.as_str().to_string(),
            sender_name: message.sender_name.clone(),
            text: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

impl From<&OutboundEvent> for ServerMessage {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::PresenceUpdate { room_id, members } => Self::PresenceUpdate {
                room_id: room_id.as_str().to_string(),
                members: members.iter().map(|m| m.as_str().to_string()).collect(),
            },
            OutboundEvent::CodeChange(change) => Self::CodeChange {
                room_id: change.room_id.as_str().to_string(),
                file_path: change.file_path.clone(),
                text: change.text.clone(),
            },
            OutboundEvent::ChatMessage { room_id, message } => Self::ChatMessage {
                room_id: room_id.as_str().to_string(),
                message: message.into(),
            },
            OutboundEvent::FileSystemChange { room_id } => Self::FileSystemChange {
                room_id: room_id.as_str().to_string(),
            },
        }
    }
}

impl From<PresenceSnapshot> for PresenceSnapshotDto {
    fn from(snapshot: PresenceSnapshot) -> Self {
        Self {
            room_id: snapshot.room_id.into_string(),
            members: snapshot
                .members
                .into_iter()
                .map(MemberId::into_string)
                .collect(),
            subscribers: snapshot.subscribers,
        }
    }
}
