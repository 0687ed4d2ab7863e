//! UI layer: axum routes, WebSocket transport and process signals.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;
