//! CodeSync real-time collaboration server.
//!
//! Tracks who is present in each room and relays code, chat and file-tree
//! events between the connections subscribed to it.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codesync-server
//! cargo run --bin codesync-server -- --host 0.0.0.0 --port 3000 --storage-dir ./data --room R1 --room R2
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use codesync_server::{
    config::ServerConfig,
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::server::Server,
    usecase::{
        EventRouter, JoinAdmission, RealtimeContext, SessionLifecycleManager, spawn_event_loop,
    },
};
use codesync_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "codesync-server")]
#[command(about = "Real-time collaboration server for CodeSync rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// Directory where relayed file contents are saved
    #[arg(short = 's', long)]
    storage_dir: Option<PathBuf>,

    /// Room that may be joined (repeatable); every room is accepted when omitted
    #[arg(short = 'r', long = "room")]
    rooms: Vec<String>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            storage_dir: args.storage_dir,
            rooms: args.rooms,
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Collaborators
    let directory = config.room_directory()?;
    let mut router = EventRouter::new(Arc::new(SystemClock));
    match config.file_service() {
        Some(file_service) => {
            tracing::info!("Saving relayed files under {:?}", config.storage_dir);
            router = router.with_file_service(file_service);
        }
        None => tracing::info!("No storage directory configured; relaying only"),
    }
    if !config.rooms.is_empty() {
        tracing::info!("Accepting joins for rooms: {}", config.rooms.join(", "));
    }

    // 2. Realtime core
    let ctx = RealtimeContext::new(Box::new(WebSocketMessagePusher::new()));
    let (handle, _loop_task) = spawn_event_loop(ctx, SessionLifecycleManager::new(router));

    // 3. Server
    let server = Server::new(handle, JoinAdmission::new(directory));
    server.run(config.host, config.port).await
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
