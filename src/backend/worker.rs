use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use super::Backend;
use crate::error::BackendError;
use crate::model::{OperationResult, PendingOperation, SequenceNumber, Snapshot};

/// Backend work the interaction loop wants done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Fetch {
        seq: SequenceNumber,
        revset: String,
    },
    Submit(PendingOperation),
}

/// A finished request, delivered back to the interaction loop.
#[derive(Debug)]
pub enum BackendEvent {
    Snapshot {
        seq: SequenceNumber,
        result: Result<Snapshot, BackendError>,
    },
    Operation {
        id: u64,
        result: Result<OperationResult, BackendError>,
    },
}

/// Runs backend calls on a small tokio runtime so the interaction loop
/// never blocks on `jj`.
pub struct Worker {
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    tx: UnboundedSender<BackendEvent>,
    rx: UnboundedReceiver<BackendEvent>,
}

impl Worker {
    pub fn new(backend: Arc<dyn Backend>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("jjdag-backend")
            .enable_all()
            .build()
            .context("start backend runtime")?;
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            runtime,
            backend,
            tx,
            rx,
        })
    }

    pub fn send(&self, request: Request) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        debug!(?request, "dispatching to backend worker");
        self.runtime.spawn(async move {
            let lost = match &request {
                Request::Fetch { seq, .. } => BackendEvent::Snapshot {
                    seq: *seq,
                    result: Err(BackendError::Disconnected),
                },
                Request::Submit(op) => BackendEvent::Operation {
                    id: op.id,
                    result: Err(BackendError::Disconnected),
                },
            };
            let event = tokio::task::spawn_blocking(move || match request {
                Request::Fetch { seq, revset } => BackendEvent::Snapshot {
                    seq,
                    result: backend.fetch_snapshot(&revset, seq),
                },
                Request::Submit(op) => BackendEvent::Operation {
                    id: op.id,
                    result: backend.submit(&op),
                },
            })
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "backend task panicked");
                lost
            });
            if tx.send(event).is_err() {
                debug!("interaction loop is gone; dropping backend result");
            }
        });
    }

    pub fn send_all(&self, requests: impl IntoIterator<Item = Request>) {
        for r in requests {
            self.send(r);
        }
    }

    /// Next finished request, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<BackendEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next finished request. Only for use outside the
    /// interaction loop (one-shot commands and tests).
    pub fn recv_blocking(&mut self) -> Option<BackendEvent> {
        self.rx.blocking_recv()
    }
}

#[cfg(test)]
#[path = "../tests/backend/worker_tests.rs"]
mod tests;
