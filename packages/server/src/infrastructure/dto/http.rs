//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of one room's real-time state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshotDto {
    pub room_id: String,
    /// Present members, in join order
    pub members: Vec<String>,
    /// Number of live connections subscribed to the room
    pub subscribers: usize,
}
