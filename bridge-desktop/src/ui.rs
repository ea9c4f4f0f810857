//! UI Context Implementation
//!
//! Desktop hosts have no platform main looper available to a library, so the
//! UI-owning context is modelled as one Tokio task draining a queue.

use bridge_traits::{
    error::{BridgeError, Result},
    ui::{UiDispatcher, UiJob},
};
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Serial job queue standing in for the UI thread.
///
/// Jobs run one at a time in submission order; a job that awaits blocks
/// the queue until it resolves, exactly like work posted to a main looper.
pub struct TokioUiDispatcher {
    sender: mpsc::UnboundedSender<UiJob>,
    worker: JoinHandle<()>,
}

impl TokioUiDispatcher {
    /// Start the UI context. Must be called from within a Tokio runtime.
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<UiJob>();

        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                trace!("Running UI job");
                job.await;
            }
            debug!("UI context stopped");
        });

        Self { sender, worker }
    }

    /// Resolves once every job queued before this call has finished.
    pub async fn idle(&self) {
        let (tx, rx) = oneshot::channel();
        let job = async move {
            let _ = tx.send(());
        }
        .boxed();

        if self.sender.send(job).is_ok() {
            let _ = rx.await;
        }
    }

    /// Stop accepting work and wait for the queue to drain.
    pub async fn shutdown(self) {
        drop(self.sender);
        let _ = self.worker.await;
    }
}

impl UiDispatcher for TokioUiDispatcher {
    fn dispatch(&self, job: UiJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| BridgeError::NotAvailable("UI context has stopped".to_string()))
    }
}
