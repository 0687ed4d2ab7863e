//! WebSocket client session management.

use codesync_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};
use futures_util::{Sink, SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, http::StatusCode, protocol::Message},
};
use url::Url;

use crate::{
    command::{Action, CommandError, SharedState, USAGE},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Build the handshake URL with `member_id` as an encoded query pair.
fn handshake_url(base: &str, member_id: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))?;
    url.query_pairs_mut().append_pair("member_id", member_id);
    Ok(url)
}

/// Interpret one input line against the shared state; the lock is released
/// before any frame is sent.
async fn apply_line(state: &SharedState, line: &str) -> Result<Action, CommandError> {
    state.lock().await.apply(line)
}

/// Run one WebSocket client session until the user exits or the connection
/// drops.
///
/// Room changes made during the session stay in `state`, so the next session
/// rejoins wherever the user was.
pub async fn run_client_session(url: &str, state: SharedState) -> Result<(), ClientError> {
    let (member_id, join) = {
        let state = state.lock().await;
        (state.member_id.clone(), state.join_message())
    };
    let url = handshake_url(url, &member_id)?;

    let (ws_stream, _response) = match connect_async(url.as_str()).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response))
            if response.status() == StatusCode::BAD_REQUEST =>
        {
            return Err(ClientError::Rejected(member_id));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to CodeSync server!");
    println!(
        "\nYou are '{}'. Type a message or /help, press Enter to send. Press Ctrl+C to exit.\n",
        member_id
    );

    let (mut write, mut read) = ws_stream.split();

    // Rejoin the current room on every (re)connect
    if let Some(join) = join {
        send_frame(&mut write, &join).await?;
    }

    let member_for_read = member_id.clone();

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(message) => {
                            MessageFormatter::format_server_message(&message, &member_for_read)
                        }
                        Err(_) => MessageFormatter::format_raw_message(&text),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&member_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&member_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = format!("{}> ", member_id);

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into frames
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let frames = match apply_line(&state, &line).await {
                Ok(Action::Send(frames)) => frames,
                Ok(Action::Help) => {
                    print!("{}", USAGE);
                    redisplay_prompt(&member_id);
                    continue;
                }
                Err(e) => {
                    println!("{}", e);
                    redisplay_prompt(&member_id);
                    continue;
                }
            };

            for frame in &frames {
                if let Err(e) = send_frame(&mut write, frame).await {
                    tracing::warn!("Failed to send message: {}", e);
                    return true;
                }
            }
        }

        false
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}

async fn send_frame<S>(write: &mut S, frame: &ClientMessage) -> Result<(), ClientError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json =
        serde_json::to_string(frame).map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::ClientState;

    #[test]
    fn test_handshake_url_encodes_member_id() {
        // テスト項目: member_id に記号が含まれてもクエリとして正しくエンコードされる
        // given (前提条件):
        let base = "ws://127.0.0.1:8000/ws";

        // when (操作):
        let url = handshake_url(base, "a&b #c").unwrap();

        // then (期待する結果):
        assert_eq!(url.as_str(), "ws://127.0.0.1:8000/ws?member_id=a%26b+%23c");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("member_id".to_string(), "a&b #c".to_string())]);
    }

    #[test]
    fn test_handshake_url_rejects_unparsable_base() {
        // テスト項目: 解釈できない URL は InvalidUrl になる
        // given (前提条件):
        let base = "not a url";

        // when (操作):
        let result = handshake_url(base, "alice");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_join_survives_into_next_session() {
        // テスト項目: セッション中の /join は再接続後の join フレームに引き継がれる
        // given (前提条件):
        let state = ClientState::new("alice", Some("R1".to_string())).shared();
        let session_state = Arc::clone(&state);

        // when (操作):
        apply_line(&session_state, "/join R2").await.unwrap();
        drop(session_state);

        // then (期待する結果):
        let next_session_state = Arc::clone(&state);
        assert_eq!(
            next_session_state.lock().await.join_message(),
            Some(ClientMessage::JoinRoom {
                room_id: "R2".to_string(),
                member_id: "alice".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_leave_survives_into_next_session() {
        // テスト項目: セッション中の /leave の後は再接続してもどのルームにも入らない
        // given (前提条件):
        let state = ClientState::new("alice", Some("R1".to_string())).shared();

        // when (操作):
        apply_line(&Arc::clone(&state), "/leave").await.unwrap();

        // then (期待する結果):
        assert_eq!(state.lock().await.join_message(), None);
    }
}
