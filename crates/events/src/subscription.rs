//! Listener tasks over a field-change receiver.
//!
//! [`Subscription::spawn`] drives a handler for every received
//! [`FieldChange`] until the subscription is cancelled, dropped, or the
//! sending side goes away.

use std::future::Future;

use brandlink_core::FieldChange;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running field-change listener.
///
/// Dropping the handle stops the listener after the change it is
/// currently handling, if any.
pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn a listener task calling `handler` for each change, in order.
    pub fn spawn<F, Fut>(receiver: broadcast::Receiver<FieldChange>, handler: F) -> Self
    where
        F: FnMut(FieldChange) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(listen(receiver, handler, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Whether the listener is still running.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the listener and wait until it has exited.
    ///
    /// No handler call starts after this returns.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn listen<F, Fut>(
    mut receiver: broadcast::Receiver<FieldChange>,
    mut handler: F,
    cancel: CancellationToken,
) where
    F: FnMut(FieldChange) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let change = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = receiver.recv() => received,
        };

        match change {
            Ok(change) => handler(change).await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Field listener lagged behind, changes skipped");
            }
            Err(RecvError::Closed) => {
                tracing::debug!("Field change channel closed");
                break;
            }
        }
    }
}
