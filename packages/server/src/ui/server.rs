//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{JoinAdmission, RealtimeHandle};

use super::{
    handler::{get_room_presence, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Real-time collaboration server
///
/// # Example
///
/// ```ignore
/// let (handle, _loop_task) = spawn_event_loop(ctx, manager);
/// let server = Server::new(handle, JoinAdmission::new(Arc::new(OpenRoomDirectory)));
/// server.run("127.0.0.1".to_string(), 8000).await?;
/// ```
pub struct Server {
    handle: RealtimeHandle,
    admission: JoinAdmission,
}

impl Server {
    pub fn new(handle: RealtimeHandle, admission: JoinAdmission) -> Self {
        Self { handle, admission }
    }

    /// Build the axum router with every route of the server.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            handle: self.handle.clone(),
            admission: self.admission.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms/{room_id}/presence", get(get_room_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("CodeSync server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?member_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener without signal handling.
    ///
    /// Used by integration tests that bind to an ephemeral port.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}
