//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(member_id: &str) {
    print!("{}> ", member_id);
    std::io::stdout().flush().ok();
}
