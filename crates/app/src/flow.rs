//! Flow lifetime and cancellation
//!
//! Every page visit gets a [`FlowScope`]. Network calls made on behalf of
//! the visit run through [`FlowScope::guard`]; once the scope is cancelled
//! (explicitly, or because its owner went away) late results are dropped
//! instead of being applied to a disposed selection.

use std::future::Future;
use std::sync::Arc;

use cinema_core::{Error, Result};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Cancellation handle for one flow. Clones share the same signal.
#[derive(Clone)]
pub struct FlowScope {
    id: Uuid,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl FlowScope {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        if !self.is_cancelled() {
            debug!(flow_id = %self.id, "Flow cancelled");
        }
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Run `fut` unless the flow is, or becomes, cancelled.
    ///
    /// A result that completes after cancellation is discarded.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut cancel_rx = self.cancel_tx.subscribe();
        if *cancel_rx.borrow_and_update() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            out = fut => {
                if self.is_cancelled() {
                    debug!(flow_id = %self.id, "Discarding result of cancelled flow");
                    Err(Error::Cancelled)
                } else {
                    out
                }
            }
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => Err(Error::Cancelled),
        }
    }
}

impl Default for FlowScope {
    fn default() -> Self {
        Self::new()
    }
}
