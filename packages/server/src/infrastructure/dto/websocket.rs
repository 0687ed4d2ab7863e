//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by `type` with kebab-case event names
//! and camelCase fields, e.g.
//!
//! ```json
//! {"type":"code-change","roomId":"R1","filePath":"main.js","text":"console.log(1)"}
//! ```

use serde::{Deserialize, Serialize};

/// Chat message as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    pub text: String,
    /// Unix timestamp in milliseconds; omitted or `0` lets the server stamp it
    #[serde(default)]
    pub timestamp: i64,
}

/// Client → server frames.
///
/// Identifier fields default to an empty string so that a frame with a
/// missing `roomId` still parses and is rejected by validation with a precise
/// log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    JoinRoom {
        #[serde(default)]
        room_id: String,
        #[serde(default)]
        member_id: String,
    },
    LeaveRoom {
        #[serde(default)]
        room_id: String,
        #[serde(default)]
        member_id: String,
    },
    CodeChange {
        #[serde(default)]
        room_id: String,
        file_path: String,
        text: String,
    },
    ChatMessage {
        #[serde(default)]
        room_id: String,
        message: ChatMessageDto,
    },
    FileSystemChange {
        #[serde(default)]
        room_id: String,
    },
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    PresenceUpdate {
        room_id: String,
        members: Vec<String>,
    },
    CodeChange {
        room_id: String,
        file_path: String,
        text: String,
    },
    ChatMessage {
        room_id: String,
        message: ChatMessageDto,
    },
    FileSystemChange {
        room_id: String,
    },
}
