//! Stop signal for a running scan.

use std::sync::Arc;
use tokio::sync::watch;

/// Held by the tracker; flips the scan's stop flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    stop: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// A token and the watcher handed to the scan task.
    pub fn new() -> (Self, CancellationWatcher) {
        let (tx, rx) = watch::channel(false);
        (Self { stop: Arc::new(tx) }, CancellationWatcher { stop: rx })
    }

    /// Ask the scan to stop.
    pub fn cancel(&self) {
        self.stop.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        *self.stop.borrow()
    }
}

/// Observes a [`CancellationToken`] from inside the scan.
///
/// The blocking walk polls [`is_cancelled`](Self::is_cancelled); the async
/// side awaits [`cancelled`](Self::cancelled).
#[derive(Debug, Clone)]
pub struct CancellationWatcher {
    stop: watch::Receiver<bool>,
}

impl CancellationWatcher {
    /// Whether the scan should stop.
    pub fn is_cancelled(&self) -> bool {
        *self.stop.borrow()
    }

    /// Resolves once cancelled. Pends forever if the token is dropped first.
    pub async fn cancelled(&mut self) {
        let stopped = self.stop.wait_for(|stop| *stop).await.is_ok();
        if !stopped {
            std::future::pending::<()>().await;
        }
    }
}
