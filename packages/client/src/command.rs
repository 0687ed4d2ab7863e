//! 入力行 → 送信フレームの変換
//!
//! - `hello` のような通常の行: チャットメッセージ
//! - `/code <path> <text>`: ファイル内容の置き換え
//! - `/join <room>`: 今のルームを抜けて別のルームへ
//! - `/leave`: 今のルームを抜ける
//! - `/refresh`: ファイルツリー変更の通知
//! - `/help`: 使い方の表示

use std::sync::Arc;

use codesync_server::infrastructure::dto::websocket::{ChatMessageDto, ClientMessage};
use thiserror::Error;
use tokio::sync::Mutex;

pub const USAGE: &str = "\
Commands:
  <text>               send a chat message
  /code <path> <text>  replace the contents of a file
  /join <room>         switch to another room
  /leave               leave the current room
  /refresh             tell the room the file tree changed
  /help                show this help
";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("join a room first (/join <room>)")]
    NotInRoom,

    #[error("usage: {0}")]
    MissingArgument(&'static str),

    #[error("unknown command '{0}' (try /help)")]
    UnknownCommand(String),
}

/// What the session should do with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Vec<ClientMessage>),
    Help,
}

/// Client state shared by the reconnect loop and every session it starts,
/// so `/join` and `/leave` survive a reconnect.
pub type SharedState = Arc<Mutex<ClientState>>;

/// Who the user is and which room they are in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    pub member_id: String,
    pub room: Option<String>,
}

impl ClientState {
    pub fn new(member_id: impl Into<String>, room: Option<String>) -> Self {
        Self {
            member_id: member_id.into(),
            room,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Frame that (re)joins the current room after connecting.
    pub fn join_message(&self) -> Option<ClientMessage> {
        self.room.as_ref().map(|room| ClientMessage::JoinRoom {
            room_id: room.clone(),
            member_id: self.member_id.clone(),
        })
    }

    /// Interpret one trimmed, non-empty input line.
    pub fn apply(&mut self, line: &str) -> Result<Action, CommandError> {
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Action::Send(vec![self.chat(line)?]));
        };

        let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
        let args = args.trim();

        match name {
            "help" => Ok(Action::Help),
            "code" => {
                let (file_path, text) = args
                    .split_once(' ')
                    .ok_or(CommandError::MissingArgument("/code <path> <text>"))?;
                Ok(Action::Send(vec![ClientMessage::CodeChange {
                    room_id: self.current_room()?,
                    file_path: file_path.to_string(),
                    text: text.to_string(),
                }]))
            }
            "join" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument("/join <room>"));
                }
                let mut frames = Vec::new();
                if let Some(leave) = self.leave_message() {
                    frames.push(leave);
                }
                self.room = Some(args.to_string());
                frames.extend(self.join_message());
                Ok(Action::Send(frames))
            }
            "leave" => {
                let leave = self.leave_message().ok_or(CommandError::NotInRoom)?;
                self.room = None;
                Ok(Action::Send(vec![leave]))
            }
            "refresh" => Ok(Action::Send(vec![ClientMessage::FileSystemChange {
                room_id: self.current_room()?,
            }])),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn chat(&self, text: &str) -> Result<ClientMessage, CommandError> {
        Ok(ClientMessage::ChatMessage {
            room_id: self.current_room()?,
            message: ChatMessageDto {
                sender_id: self.member_id.clone(),
                sender_name: self.member_id.clone(),
                text: text.to_string(),
                // Stamped by the server.
                timestamp: 0,
            },
        })
    }

    fn leave_message(&self) -> Option<ClientMessage> {
        self.room.as_ref().map(|room| ClientMessage::LeaveRoom {
            room_id: room.clone(),
            member_id: self.member_id.clone(),
        })
    }

    fn current_room(&self) -> Result<String, CommandError> {
        self.room.clone().ok_or(CommandError::NotInRoom)
    }
}
