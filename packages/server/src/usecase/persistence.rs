//! UseCase: コード変更の永続化ワーカー
//!
//! File Service への保存はすべて 1 本のワーカータスクに mpsc で渡され、
//! 到着順に 1 件ずつ実行されます。同じファイルへの保存が追い越すことはなく、
//! 最後に届いたバッファが最後に書き込まれます。イベントループは投入するだけで
//! 保存の完了を待ちません。

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{CodeChange, FileService};

/// Sender side of the persistence worker.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<CodeChange>,
}

impl SaveQueue {
    /// Start the worker on the current tokio runtime.
    ///
    /// The worker stops once every `SaveQueue` clone has been dropped and the
    /// pending saves are written.
    pub fn spawn(file_service: Arc<dyn FileService>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_save_worker(file_service, rx));
        Self { tx }
    }

    /// Queue a buffer for saving. Never blocks.
    pub fn enqueue(&self, change: CodeChange) {
        if let Err(e) = self.tx.send(change) {
            tracing::warn!(
                "Save worker is gone; dropping '{}' in room '{}'",
                e.0.file_path,
                e.0.room_id
            );
        }
    }
}

async fn run_save_worker(
    file_service: Arc<dyn FileService>,
    mut rx: mpsc::UnboundedReceiver<CodeChange>,
) {
    while let Some(change) = rx.recv().await {
        match file_service
            .save_file(&change.room_id, &change.file_path, &change.text)
            .await
        {
            Ok(()) => tracing::debug!(
                "Saved '{}' in room '{}' ({} bytes)",
                change.file_path,
                change.room_id,
                change.text.len()
            ),
            Err(e) => tracing::warn!(
                "Failed to save '{}' in room '{}': {}",
                change.file_path,
                change.room_id,
                e
            ),
        }
    }
}
