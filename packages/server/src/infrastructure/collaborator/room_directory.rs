//! RoomDirectory implementations.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{CollaboratorError, RoomDirectory, RoomId};

/// Accepts every room. The REST layer is trusted to have checked the room
/// before handing out the real-time URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenRoomDirectory;

#[async_trait]
impl RoomDirectory for OpenRoomDirectory {
    async fn room_exists(&self, _room_id: &RoomId) -> Result<bool, CollaboratorError> {
        Ok(true)
    }
}

/// Fixed allow-list of rooms, configured at startup.
#[derive(Debug, Default, Clone)]
pub struct StaticRoomDirectory {
    rooms: HashSet<RoomId>,
}

impl StaticRoomDirectory {
    pub fn new(rooms: impl IntoIterator<Item = RoomId>) -> Self {
        Self {
            rooms: rooms.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[async_trait]
impl RoomDirectory for StaticRoomDirectory {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, CollaboratorError> {
        Ok(self.rooms.contains(room_id))
    }
}
