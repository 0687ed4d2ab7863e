//! Terminal client for CodeSync rooms with reconnection support.
//!
//! Connects to a CodeSync server, joins a room and sends typed lines as chat
//! messages. Slash commands relay code (`/code`), switch rooms (`/join`,
//! `/leave`) and announce file-tree changes (`/refresh`).
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codesync-client -- --member-id alice --room R1
//! cargo run --bin codesync-client -- -m bob -r R1 -u ws://127.0.0.1:8000/ws
//! ```

use clap::Parser;

use codesync_client::run_client;
use codesync_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "codesync-client")]
#[command(about = "Terminal client for CodeSync real-time rooms", long_about = None)]
struct Args {
    /// Member ID announced to the server
    #[arg(short = 'm', long)]
    member_id: String,

    /// Room to join after connecting
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8000/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(args.url, args.member_id, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
