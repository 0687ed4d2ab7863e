//! Domain layer: value objects, entities, typed events and the two in-memory
//! stores of the real-time core (presence and room channels), plus the traits
//! the core needs from the outside world.

pub mod channel;
pub mod collaborator;
pub mod entity;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod value_object;

pub use channel::RoomChannelRegistry;
pub use collaborator::{FileService, RoomDirectory};
pub use entity::{ChatMessage, CodeChange, Session, SessionState};
pub use error::{CollaboratorError, DomainError, MessagePushError};
pub use event::{InboundEvent, OutboundEvent};
pub use presence::{PresenceChange, PresenceStore};
pub use pusher::{MessagePusher, PusherChannel};
pub use value_object::{ConnectionId, MemberId, RoomId};

#[cfg(test)]
pub use collaborator::{MockFileService, MockRoomDirectory};
#[cfg(test)]
pub use pusher::MockMessagePusher;
