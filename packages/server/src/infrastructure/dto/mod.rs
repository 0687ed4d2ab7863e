//! Data Transfer Objects (DTOs) for the real-time protocol.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs (JSON, `type`-tagged)
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
