//! 外部コラボレーターの実装
//!
//! - `room_directory`: `RoomDirectory` の実装（全許可 / 固定リスト）
//! - `file_service`: `FileService` の実装（ローカルディスク）

pub mod file_service;
pub mod room_directory;

pub use file_service::DiskFileService;
pub use room_directory::{OpenRoomDirectory, StaticRoomDirectory};
