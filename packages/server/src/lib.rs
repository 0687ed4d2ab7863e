//! CodeSync real-time collaboration server library.
//!
//! Presence tracking, room channels and event fan-out for collaborative code
//! editing sessions, served over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
