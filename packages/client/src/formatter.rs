//! Message formatting utilities for client display.

use codesync_server::infrastructure::dto::websocket::{ChatMessageDto, ServerMessage};
use codesync_shared::time::{timestamp_to_local_clock, timestamp_to_rfc3339};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any frame pushed by the server.
    ///
    /// `current_member_id` marks the user's own entries with "(me)".
    pub fn format_server_message(message: &ServerMessage, current_member_id: &str) -> String {
        match message {
            ServerMessage::PresenceUpdate { room_id, members } => {
                Self::format_presence(room_id, members, current_member_id)
            }
            ServerMessage::CodeChange {
                room_id,
                file_path,
                text,
            } => Self::format_code_change(room_id, file_path, text),
            ServerMessage::ChatMessage { room_id, message } => {
                Self::format_chat_message(room_id, message)
            }
            ServerMessage::FileSystemChange { room_id } => {
                format!("\n* [{}] file tree changed\n", room_id)
            }
        }
    }

    /// Format the roster of a room
    pub fn format_presence(room_id: &str, members: &[String], current_member_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Members of {}:\n", room_id));

        if members.is_empty() {
            output.push_str("(No members)\n");
        } else {
            for member in members {
                let me_suffix = if member == current_member_id {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!("{}{}\n", member, me_suffix));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a relayed file replacement; long buffers are shortened to their
    /// first line.
    pub fn format_code_change(room_id: &str, file_path: &str, text: &str) -> String {
        let mut lines = text.lines();
        let first = lines.next().unwrap_or("");
        let more = lines.count();
        if more == 0 {
            format!("\n~ [{}] {} updated: {}\n", room_id, file_path, first)
        } else {
            format!(
                "\n~ [{}] {} updated: {} (+{} more lines)\n",
                room_id, file_path, first, more
            )
        }
    }

    /// Format a chat message
    pub fn format_chat_message(room_id: &str, message: &ChatMessageDto) -> String {
        let from = if message.sender_name.is_empty() {
            &message.sender_id
        } else {
            &message.sender_name
        };
        format!(
            "\n\n------------------------------------------------------------\n\
             [{} {}] @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            room_id,
            timestamp_to_local_clock(message.timestamp),
            from,
            message.text,
            timestamp_to_rfc3339(message.timestamp)
        )
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_presence_marks_me() {
        // テスト項目: 名簿の表示で自分に (me) が付く
        // given (前提条件):
        let members = vec!["alice".to_string(), "bob".to_string()];

        // when (操作):
        let result = MessageFormatter::format_presence("R1", &members, "bob");

        // then (期待する結果):
        assert!(result.contains("Members of R1:"));
        assert!(result.contains("alice\n"));
        assert!(result.contains("bob (me)\n"));
    }

    #[test]
    fn test_format_presence_empty() {
        // テスト項目: 誰も居ないルームは (No members) と表示される
        // given (前提条件):
        let members: Vec<String> = Vec::new();

        // when (操作):
        let result = MessageFormatter::format_presence("R1", &members, "alice");

        // then (期待する結果):
        assert!(result.contains("(No members)"));
    }

    #[test]
    fn test_format_chat_message() {
        // テスト項目: チャットは送信者名・本文・UTC の送信時刻を表示する
        // given (前提条件):
        let message = ChatMessageDto {
            sender_id: "alice".to_string(),
            sender_name: "Alice".to_string(),
            text: "hello".to_string(),
            timestamp: 1_672_531_200_000,
        };

        // when (操作):
        let result = MessageFormatter::format_chat_message("R1", &message);

        // then (期待する結果):
        assert!(result.contains("[R1 "));
        assert!(result.contains("] @Alice: hello"));
        assert!(result.contains("sent at 2023-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_format_chat_message_falls_back_to_sender_id() {
        // テスト項目: 表示名が無ければ送信者 ID を表示する
        // given (前提条件):
        let message = ChatMessageDto {
            sender_id: "alice".to_string(),
            sender_name: String::new(),
            text: "hi".to_string(),
            timestamp: 0,
        };

        // when (操作):
        let result = MessageFormatter::format_chat_message("R1", &message);

        // then (期待する結果):
        assert!(result.contains("@alice: hi"));
    }

    #[test]
    fn test_format_code_change_shortens_multiline_text() {
        // テスト項目: 複数行のコードは 1 行目と残り行数だけを表示する
        // given (前提条件):
        let text = "fn main() {\n    println!(\"hi\");\n}";

        // when (操作):
        let single = MessageFormatter::format_code_change("R1", "a.rs", "let x = 1;");
        let multi = MessageFormatter::format_code_change("R1", "main.rs", text);

        // then (期待する結果):
        assert_eq!(single, "\n~ [R1] a.rs updated: let x = 1;\n");
        assert_eq!(multi, "\n~ [R1] main.rs updated: fn main() { (+2 more lines)\n");
    }

    #[test]
    fn test_format_server_message_dispatches_by_type() {
        // テスト項目: サーバーからのフレームは種類に応じた形式で表示される
        // given (前提条件):
        let message = ServerMessage::FileSystemChange {
            room_id: "R1".to_string(),
        };

        // when (操作):
        let result = MessageFormatter::format_server_message(&message, "alice");

        // then (期待する結果):
        assert_eq!(result, "\n* [R1] file tree changed\n");
    }
}
