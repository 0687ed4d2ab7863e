//! FileService implementation backed by the local disk.
//!
//! The real-time core only relays code changes; when a storage directory is
//! configured the relayed buffer is also written here.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{CollaboratorError, DomainError, FileService, RoomId};

/// Writes each room's files under `<root>/<room_id>/<file_path>`.
#[derive(Debug, Clone)]
pub struct DiskFileService {
    root: PathBuf,
}

impl DiskFileService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a room-relative path, refusing anything that could escape the
    /// room directory.
    pub fn resolve(&self, room_id: &RoomId, file_path: &str) -> Result<PathBuf, DomainError> {
        let room_dir = single_component(room_id.as_str())
            .ok_or_else(|| DomainError::InvalidFilePath(room_id.as_str().to_string()))?;

        let relative = Path::new(file_path);
        let mut resolved = self.root.join(room_dir);
        let mut has_file = false;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    has_file = true;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::InvalidFilePath(file_path.to_string()));
                }
            }
        }

        if !has_file {
            return Err(DomainError::InvalidFilePath(file_path.to_string()));
        }
        Ok(resolved)
    }
}

fn single_component(value: &str) -> Option<&str> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(value),
        _ => None,
    }
}

#[async_trait]
impl FileService for DiskFileService {
    async fn save_file(
        &self,
        room_id: &RoomId,
        file_path: &str,
        text: &str,
    ) -> Result<(), CollaboratorError> {
        let path = self.resolve(room_id, file_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, text).await?;
        tracing::debug!("Saved {} byte(s) to {}", text.len(), path.display());
        Ok(())
    }
}
