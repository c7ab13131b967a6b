//! Fetcher pool
//!
//! N workers poll a shared [`TextSource`] in parallel and hand trimmed,
//! non-empty text to the coordinator over one channel. The channel holds a
//! single item, so a worker with a result waits until the coordinator takes
//! it; there is no other queue between them.
//!
//! Workers never report failures. Every attempt, successful or not, is
//! followed by the same fixed delay. A worker stops only when the shutdown
//! token is cancelled or the receiving side is gone. The pool is never
//! joined: [`FetcherPool::abandon`] (or drop) aborts whatever is still
//! running, including requests in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::source::TextSource;

/// Capacity of the hand-off channel between workers and the coordinator.
pub const HANDOFF_CAPACITY: usize = 1;

pub struct FetcherPool {
    tasks: JoinSet<()>,
}

impl FetcherPool {
    /// Start `workers` fetch loops over `source`.
    ///
    /// Returns the pool and the receiving end of the shared item channel.
    pub fn spawn<S: TextSource>(
        source: Arc<S>,
        workers: usize,
        retry_delay: Duration,
        shutdown: CancellationToken,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
        let mut tasks = JoinSet::new();

        for worker_id in 0..workers {
            let source = Arc::clone(&source);
            let tx = tx.clone();
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                run_worker(worker_id, source, tx, retry_delay, shutdown).await;
            });
        }

        info!(workers, "Fetch workers started");

        (Self { tasks }, rx)
    }

    /// Number of workers that have not exited yet
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Abort all workers without waiting for them.
    pub fn abandon(mut self) {
        self.tasks.abort_all();
    }
}

async fn run_worker<S: TextSource>(
    worker_id: usize,
    source: Arc<S>,
    tx: mpsc::Sender<String>,
    retry_delay: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let attempt = tokio::select! {
            _ = shutdown.cancelled() => break,
            attempt = source.fetch_text() => attempt,
        };

        match attempt {
            Ok(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        sent = tx.send(text.to_string()) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            },
            Err(e) => {
                trace!(worker_id, error = %e, "Fetch attempt failed");
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(retry_delay) => {}
        }
    }

    debug!(worker_id, "Fetch worker stopped");
}
