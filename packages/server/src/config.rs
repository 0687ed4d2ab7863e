//! Server configuration and collaborator wiring.

use std::{path::PathBuf, sync::Arc};

use crate::{
    domain::{DomainError, FileService, RoomDirectory, RoomId},
    infrastructure::collaborator::{DiskFileService, OpenRoomDirectory, StaticRoomDirectory},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// File contents are written here when set; otherwise the server only relays
    pub storage_dir: Option<PathBuf>,
    /// Allow-list of rooms; empty means every room may be joined
    pub rooms: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            storage_dir: None,
            rooms: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn room_directory(&self) -> Result<Arc<dyn RoomDirectory>, DomainError> {
        if self.rooms.is_empty() {
            return Ok(Arc::new(OpenRoomDirectory));
        }

        let rooms = self
            .rooms
            .iter()
            .map(|room| RoomId::new(room.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(StaticRoomDirectory::new(rooms)))
    }

    pub fn file_service(&self) -> Option<Arc<dyn FileService>> {
        self.storage_dir
            .as_ref()
            .map(|dir| Arc::new(DiskFileService::new(dir.clone())) as Arc<dyn FileService>)
    }
}
