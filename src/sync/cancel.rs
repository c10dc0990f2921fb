//! Cooperative cancellation for a sync run
//!
//! The runner interrupts a job with SIGINT before killing it. The binary
//! turns that into [`CancelHandle::cancel`]; the pipeline observes it at
//! stage boundaries and inside the temporary-ref fallback, where it still
//! deletes the temporary branch before returning [`Error::Cancelled`].

use crate::error::{Error, Result};
use tokio::sync::watch;

/// Triggers cancellation of every [`CancelToken`] it was paired with
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation requests
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle and token
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        cancel_pair().1
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// `Err(Error::Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve when cancellation is requested
    ///
    /// Pends forever if the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}
