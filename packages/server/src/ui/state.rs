//! Shared application state.

use crate::usecase::{JoinAdmission, RealtimeHandle};

/// State handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    /// イベントループへの入口（全接続で共有）
    pub handle: RealtimeHandle,
    /// join-room のルーム存在確認
    pub admission: JoinAdmission,
}
