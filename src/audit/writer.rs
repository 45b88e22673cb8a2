//! Background Audit Writer
//!
//! Settlement hands records to a queue and returns. One task drains the
//! queue into the sink in submission order.
//!
//! ```text
//! Settlement::spin ──submit──► [unbounded queue] ──► writer task ──► AuditSink
//!                                                         │
//!                                               errors: warn!, dropped
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::audit::log::AuditSink;
use crate::audit::record::AuditRecord;

enum Command {
    Append(Box<AuditRecord>),
    Flush(oneshot::Sender<()>),
}

/// Non-blocking front for an [`AuditSink`].
///
/// The queue is unbounded so a slow sink never pushes back on
/// settlement; records wait in memory until the sink catches up.
/// Dropping the writer closes the queue. The task drains what is left,
/// then exits.
pub struct AuditWriter {
    sender: mpsc::UnboundedSender<Command>,
}

impl AuditWriter {
    /// Start the writer task for `sink`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(sink: Arc<dyn AuditSink>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Command>();

        tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    Command::Append(record) => {
                        if let Err(e) = sink.append(&record).await {
                            warn!("Failed to append audit record for round {}: {}", record.round_id, e);
                        }
                    }
                    Command::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Audit writer stopped");
        });

        Self { sender }
    }

    /// Queue a record. Never waits on the sink.
    pub fn submit(&self, record: AuditRecord) {
        if self.sender.send(Command::Append(Box::new(record))).is_err() {
            warn!("Audit writer is gone, record dropped");
        }
    }

    /// Wait until every record submitted so far has reached the sink.
    ///
    /// Waits as long as the sink does.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}
