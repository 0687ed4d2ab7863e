//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId, infrastructure::dto::http::PresenceSnapshotDto, ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Read-only presence snapshot of one room
pub async fn get_room_presence(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<PresenceSnapshotDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|e| {
        tracing::warn!("Invalid room id in presence request: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    match state.handle.snapshot(room_id).await {
        Ok(snapshot) => Ok(Json(PresenceSnapshotDto::from(snapshot))),
        Err(e) => {
            tracing::error!("Failed to read presence snapshot: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
