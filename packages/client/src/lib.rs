//! Terminal client for CodeSync rooms.
//!
//! Joins a room over WebSocket, prints presence, chat and code events, and
//! turns typed lines into chat messages or slash commands.

mod command;
mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use command::{Action, ClientState, CommandError, SharedState};
pub use error::ClientError;
pub use runner::run_client;
