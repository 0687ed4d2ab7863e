//! Infrastructure layer: wire DTOs, the WebSocket message pusher and the
//! adapters for external collaborators.

pub mod collaborator;
pub mod dto;
pub mod message_pusher;
