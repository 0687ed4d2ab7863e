//! UseCase layer: the real-time core that ties the domain stores together.
//!
//! - `context`: the single `RealtimeContext` owned by the event loop
//! - `router`: typed dispatch of inbound events
//! - `session`: per-connection lifecycle and the disconnect finalizer
//! - `event_loop`: the task that serializes every mutation
//! - `persistence`: ordered save worker in front of the File Service
//! - `admission`: room existence check for joins, run before the loop

pub mod admission;
pub mod context;
pub mod error;
pub mod event_loop;
pub mod persistence;
pub mod router;
pub mod session;

pub use admission::JoinAdmission;
pub use context::{PresenceSnapshot, RealtimeContext};
pub use error::{JoinRejected, LoopError};
pub use event_loop::{LoopCommand, RealtimeHandle, spawn_event_loop};
pub use persistence::SaveQueue;
pub use router::{DispatchOutcome, DropReason, EventRouter};
pub use session::SessionLifecycleManager;
